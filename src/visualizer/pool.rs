use nalgebra::{Point3, Vector4};

use crate::camera::Camera;
use crate::error::VisualizerError;
use crate::visualizer::quad::QuadRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuadId(pub u32);

pub struct QuadEntity<Q> {
    pub id: QuadId,
    pub visible: bool,
    pub renderer: Q,
}

/// 크기가 고정된 사각형 풀. 가장 오래전에 쓴 사각형부터 돌아가며 다시 씀.
///
/// 큐 앞에서 꺼내 쓰고 바로 뒤에 다시 넣는 방식과 같지만, 순서가 바뀌지 않으니
/// 배열과 커서 하나로 충분함.
pub struct QuadPool<Q> {
    entities: Vec<QuadEntity<Q>>,
    cursor: usize,
}

impl<Q: QuadRenderer> QuadPool<Q> {
    pub fn new(capacity: usize, mut factory: impl FnMut(QuadId) -> Q) -> Result<Self, VisualizerError> {
        if capacity == 0 {
            return Err(VisualizerError::EmptyPool);
        }

        let entities = (0..capacity as u32)
            .map(QuadId)
            .map(|id| QuadEntity {
                id,
                visible: false,
                renderer: factory(id),
            })
            .collect();

        Ok(Self { entities, cursor: 0 })
    }

    /// 커서가 가리키는 사각형을 보이게 하고 그린 뒤, 커서를 다음으로 넘김.
    pub fn display(
        &mut self,
        camera: Option<&Camera>,
        position: Point3<f32>,
        size: f32,
        color: Vector4<f32>,
    ) -> QuadId {
        let capacity = self.entities.len();
        let entity = &mut self.entities[self.cursor];
        entity.visible = true;
        entity.renderer.display(camera, position, size, color);

        self.cursor = (self.cursor + 1) % capacity;
        entity.id
    }

    pub fn capacity(&self) -> usize {
        self.entities.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entities(&self) -> &[QuadEntity<Q>] {
        &self.entities
    }

    pub fn visible(&self) -> impl Iterator<Item = &QuadEntity<Q>> {
        self.entities.iter().filter(|entity| entity.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// 커서는 그대로 둠
    pub fn hide_all(&mut self) {
        self.entities.iter_mut().for_each(|entity| entity.visible = false);
    }
}

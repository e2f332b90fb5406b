use nalgebra::{Point3, Vector4};

/// 광선 하나를 눈으로 확인하기 위한 선분
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub color: Vector4<f32>,
}

pub trait DebugLineSink {
    fn push_line(&mut self, line: DebugLine);
}

// 디버그 선을 안 쓸 때
impl DebugLineSink for () {
    fn push_line(&mut self, _line: DebugLine) {}
}

impl DebugLineSink for Vec<DebugLine> {
    fn push_line(&mut self, line: DebugLine) {
        self.push(line);
    }
}

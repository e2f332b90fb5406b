use cfg_if::cfg_if;
use log::{error, info, warn};
use web_time::Instant;
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::app::{Application, PanelState};
use crate::camera::Camera;
use crate::config::Settings;
use crate::error::VisualizerError;
use crate::visualizer::Visualizer;

// wasm32 환경에서만 wasm_bindgen 활용
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod texture;
pub mod util;
pub mod visualizer;

// wasm 연결시 아래 함수를 시작점으로 삼도록 함.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn run() {
    // 로거 초기화
    cfg_if! {
        // 만약 현재 환경이 wasm32라면
        if #[cfg(target_arch = "wasm32")] {
            // panic 발생시 웹 브라우저의 console.err에 로그 띄우기
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            // 로거가 이미 설정되어 있을 때만 실패하니 무시
            let _ = console_log::init_with_level(log::Level::Debug);
        } else {
            // 아니면 기본적인 로거만 불러오기
            env_logger::init();
        }
    }

    if let Err(error) = try_run() {
        error!("{error}");
    }
}

fn try_run() -> Result<(), VisualizerError> {
    let settings = Settings::load(&Settings::config_path())?;

    if settings.headless_output.is_some() {
        run_headless(&settings)
    } else {
        run_windowed(settings)
    }
}

/// 창 없이 몇 프레임 돌리고 마지막 캔버스를 PNG로 저장
pub fn run_headless(settings: &Settings) -> Result<(), VisualizerError> {
    let viewport_size = PhysicalSize::new(settings.viewport.width, settings.viewport.height);
    let camera = Camera::new(&settings.viewport, viewport_size);
    let mut visualizer = Visualizer::new(settings, viewport_size)?;

    for frame in 0..settings.headless_frames.max(1) {
        let stats = visualizer.update(Some(&camera));
        info!(
            "Frame {frame}: {} hits, {} visible quads, {:?}",
            stats.hits, stats.visible_quads, stats.sample_time
        );
    }

    if let Some(path) = &settings.headless_output {
        visualizer.canvas().save_png(path)?;
        info!("Saved {}", path.display());
    }

    Ok(())
}

fn run_windowed(settings: Settings) -> Result<(), VisualizerError> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Visualizer: Sphere Hits")
        .with_inner_size(PhysicalSize::new(settings.viewport.width, settings.viewport.height))
        .build(&event_loop)?;

    let mut application = pollster::block_on(Application::new(window, &event_loop))?;
    let mut camera = Camera::new(&settings.viewport, application.size);
    let mut visualizer = Visualizer::new(&settings, application.size)?;
    let mut panel = PanelState {
        pool_capacity: settings.pool_capacity,
        debug_rays: settings.debug_rays,
        ..Default::default()
    };
    let mut last_frame = Instant::now();

    info!("Window ready: {}x{}", application.size.width, application.size.height);

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == application.window.id() => {
            // 패널이 입력을 가져갔으면 카메라는 건드리지 않음
            if application.input(event) {
                return;
            }
            if camera.input(event, application.is_hovering_panel()) {
                return;
            }

            match event {
                // 만약 앱을 운영체제에서 닫으려고 하거나
                WindowEvent::CloseRequested |
                // 키보드 입력이 들어왔고
                WindowEvent::KeyboardInput {
                    input: KeyboardInput {
                        // 키보드가 새로 눌러졌으며, 그 눌러진 키가 ESC라면
                        state: ElementState::Pressed, virtual_keycode: Some(VirtualKeyCode::Escape), ..
                    }, ..
                } => *control_flow = ControlFlow::ExitWithCode(0), // 나가기

                WindowEvent::Resized(new_size) => {
                    application.resize(*new_size);
                    camera.resize(*new_size);
                    visualizer.resize(*new_size);
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    application.resize(**new_inner_size);
                    camera.resize(**new_inner_size);
                    visualizer.resize(**new_inner_size);
                }
                _ => {}
            }
        }
        Event::RedrawRequested(window_id) if window_id == application.window.id() => {
            let frame_time = last_frame.elapsed().as_millis();
            last_frame = Instant::now();

            camera.update(frame_time);
            panel.stats = visualizer.update(Some(&camera));
            panel.grab_mouse = camera.grab_mouse;

            match application.render(visualizer.canvas(), &mut panel) {
                Ok(()) => {}
                // surface를 잃어버렸으면 다시 설정
                Err(SurfaceError::Lost) => application.resize(application.size),
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory, exiting");
                    *control_flow = ControlFlow::Exit;
                }
                Err(error) => warn!("{error:?}"),
            }

            visualizer.set_debug_rays(panel.debug_rays);
        }
        Event::MainEventsCleared => application.window.request_redraw(),
        _ => {}
    });
}

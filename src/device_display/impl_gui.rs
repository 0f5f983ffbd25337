use crate::config::IndicatorColor;
use crate::device_display::interface::DeviceDisplay;
use crate::realtime::indicator::Indicator;
use crate::realtime::stop_signal::StopSignal;
use eframe::egui;
use image::DynamicImage;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Default)]
struct Shared {
    frame: Option<egui::ColorImage>,
    frame_changed: bool,
    indicator: Option<Indicator>,
    close_requested: bool,
    context: Option<egui::Context>,
    window_error: Option<String>,
}

fn color32(color: IndicatorColor) -> egui::Color32 {
    match color {
        IndicatorColor::Green => egui::Color32::from_rgb(40, 200, 80),
        IndicatorColor::Red => egui::Color32::from_rgb(220, 50, 50),
        IndicatorColor::Yellow => egui::Color32::from_rgb(230, 200, 40),
        IndicatorColor::White => egui::Color32::WHITE,
    }
}

struct CameraWindow {
    shared: Arc<Mutex<Shared>>,
    stop_signal: StopSignal,
    texture: Option<egui::TextureHandle>,
}

impl eframe::App for CameraWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.viewport().close_requested()) {
            self.stop_signal.trigger();
        }

        let Ok(mut shared) = self.shared.lock() else {
            return;
        };

        if shared.context.is_none() {
            shared.context = Some(ctx.clone());
        }
        if shared.close_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if shared.frame_changed {
            if let Some(image) = shared.frame.take() {
                self.texture = Some(ctx.load_texture("frame", image, egui::TextureOptions::LINEAR));
            }
            shared.frame_changed = false;
        }
        let indicator = shared.indicator.clone();
        drop(shared);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                if let Some(indicator) = &indicator {
                    ui.label(
                        egui::RichText::new(format!("Detected: {}", indicator.text))
                            .color(color32(indicator.color))
                            .size(24.0)
                            .strong(),
                    );
                }
                if let Some(texture) = &self.texture {
                    let size = texture.size_vec2();
                    let scale = (ui.available_width() / size.x).min(1.0);
                    ui.image((texture.id(), size * scale));
                }
            });
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// The realtime loop owns the main thread, so the window's event loop is
/// started on its own thread.
fn allow_any_thread<T>(builder: &mut winit::event_loop::EventLoopBuilder<T>) {
    #[cfg(target_os = "linux")]
    {
        winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(builder, true);
        winit::platform::wayland::EventLoopBuilderExtWayland::with_any_thread(builder, true);
    }
    #[cfg(target_os = "windows")]
    {
        winit::platform::windows::EventLoopBuilderExtWindows::with_any_thread(builder, true);
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    let _ = builder;
}

/// A window titled "Camera" showing the latest frame under its detection.
/// Escape or closing the window triggers the stop signal.
pub struct DeviceDisplayGui {
    shared: Arc<Mutex<Shared>>,
    stop_signal: StopSignal,
    window_thread: Option<JoinHandle<()>>,
}

impl DeviceDisplayGui {
    pub fn new(stop_signal: StopSignal) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            stop_signal,
            window_thread: None,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Shared>, Box<dyn Error + Send + Sync>> {
        self.shared
            .lock()
            .map_err(|e| format!("display state poisoned: {}", e).into())
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn open(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = self.shared.clone();
        let stop_signal = self.stop_signal.clone();

        let handle = thread::Builder::new()
            .name("camera-window".to_string())
            .spawn(move || {
                let options = eframe::NativeOptions {
                    viewport: egui::ViewportBuilder::default()
                        .with_title("Camera")
                        .with_inner_size([480.0, 420.0]),
                    event_loop_builder: Some(Box::new(|builder| allow_any_thread(builder))),
                    ..Default::default()
                };

                let window = CameraWindow {
                    shared: shared.clone(),
                    stop_signal: stop_signal.clone(),
                    texture: None,
                };

                // Blocks this thread until the window is closed.
                match eframe::run_native("Camera", options, Box::new(|_cc| Box::new(window))) {
                    Ok(()) => stop_signal.trigger(),
                    Err(e) => {
                        if let Ok(mut shared) = shared.lock() {
                            shared.window_error = Some(e.to_string());
                        }
                    }
                }
            })?;

        self.window_thread = Some(handle);
        Ok(())
    }

    fn render(
        &mut self,
        frame: &DynamicImage,
        indicator: &Indicator,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let rgba = frame.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        let mut shared = self.lock()?;
        if let Some(error) = &shared.window_error {
            return Err(format!("camera window failed: {}", error).into());
        }
        shared.frame = Some(image);
        shared.frame_changed = true;
        shared.indicator = Some(indicator.clone());
        if let Some(ctx) = &shared.context {
            ctx.request_repaint();
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        {
            let mut shared = self.lock()?;
            shared.close_requested = true;
            if let Some(ctx) = &shared.context {
                ctx.request_repaint();
            }
        }

        if let Some(handle) = self.window_thread.take() {
            handle.join().map_err(|_| "camera window thread panicked")?;
        }
        Ok(())
    }
}

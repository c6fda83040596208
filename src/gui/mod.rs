//! GUI module for the application.
//!
//! Provides a graphical interface using egui/eframe. Both front-ends (the
//! screenshot recognizer and the click counter) share one statistics store.

pub mod render;
pub mod state;

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui::{self, Vec2};

use crate::attributes::Attribute;
use crate::config::{self, AppSettings};
use crate::ocr::{spawn_recognition, OcrJob, OcrOutcome};
use crate::stats::{RecentOperations, StatsStore};

use state::{format_counts_summary, GuiState, Panel, StatusMessage};

/// Main GUI application struct.
pub struct GuiApp {
    /// Application state.
    state: GuiState,
    /// Settings loaded at startup.
    settings: AppSettings,
    /// Cumulative statistics.
    store: StatsStore,
    /// Undo history of the click counter.
    history: RecentOperations,
    /// Outcome channel of the recognition in flight, if any.
    pending: Option<Receiver<OcrOutcome>>,
}

impl GuiApp {
    /// Create a new GUI application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings, store: StatsStore) -> Self {
        // Configure fonts to support Chinese
        Self::setup_fonts(&cc.egui_ctx);

        let api_key = config::load_api_key(&crate::paths::get_api_key_path());

        Self {
            state: GuiState::new(settings.start_mode.into(), settings.sort_mode, api_key),
            history: RecentOperations::with_capacity(settings.undo_capacity),
            settings,
            store,
            pending: None,
        }
    }

    /// Candidate CJK font files, system locations first.
    fn font_candidates() -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = [
            "C:\\Windows\\Fonts\\msyh.ttc",   // Microsoft YaHei
            "C:\\Windows\\Fonts\\simhei.ttf", // SimHei
            "C:\\Windows\\Fonts\\simsun.ttc", // SimSun
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/STHeiti Medium.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        if let Some(user_fonts) = dirs::font_dir() {
            candidates.push(user_fonts.join("NotoSansCJK-Regular.ttc"));
            candidates.push(user_fonts.join("wqy-microhei.ttc"));
        }

        candidates
    }

    /// Setup fonts with Chinese support.
    fn setup_fonts(ctx: &egui::Context) {
        let mut fonts = egui::FontDefinitions::default();

        let mut font_loaded = false;
        for font_path in Self::font_candidates() {
            if let Ok(font_data) = std::fs::read(&font_path) {
                fonts.font_data.insert(
                    "cjk_font".to_owned(),
                    egui::FontData::from_owned(font_data).into(),
                );

                // Add CJK font as first priority for proportional text
                fonts
                    .families
                    .entry(egui::FontFamily::Proportional)
                    .or_default()
                    .insert(0, "cjk_font".to_owned());

                // Monospace keeps its own glyphs first, CJK as fallback
                fonts
                    .families
                    .entry(egui::FontFamily::Monospace)
                    .or_default()
                    .push("cjk_font".to_owned());

                crate::log(&format!("Loaded CJK font from: {}", font_path.display()));
                font_loaded = true;
                break;
            }
        }

        if !font_loaded {
            crate::log("Warning: Could not load a CJK font. Text may not display correctly.");
        }

        ctx.set_fonts(fonts);
    }

    /// Handle save API key button click.
    fn handle_save_api_key(&mut self) {
        let key = self.state.api_key_input.trim().to_string();
        if key.is_empty() {
            self.state.status = StatusMessage::Error("API Key 不能为空。".to_string());
            return;
        }

        match config::save_api_key(&crate::paths::get_api_key_path(), &key) {
            Ok(()) => {
                self.state.api_key_input = key;
                self.state.status = StatusMessage::Success("API Key 已保存。".to_string());
            }
            Err(e) => {
                crate::log(&format!("GUI: Failed to save API key: {:#}", e));
                self.state.status = StatusMessage::Error(format!("API Key 保存失败: {}", e));
            }
        }
    }

    /// Handle files dropped onto the window: the first one becomes the image.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|f| f.path) {
            self.state.image_path_input = path.display().to_string();
            self.state.panel = Panel::Ocr;
            self.state.status = StatusMessage::Info(format!("图片已选择: {}", file_label(&path)));
        }
    }

    /// Handle recognize button click.
    fn handle_recognize(&mut self) {
        if self.pending.is_some() {
            return;
        }

        let api_key = self.state.api_key_input.trim().to_string();
        if api_key.is_empty() {
            self.state.status = StatusMessage::Error("请先配置有效的 API Key。".to_string());
            return;
        }

        let path_text = self.state.image_path_input.trim();
        if path_text.is_empty() {
            self.state.status = StatusMessage::Error("请先载入图片。".to_string());
            return;
        }

        let image_path = PathBuf::from(path_text);
        let label = file_label(&image_path);
        crate::log(&format!("GUI: Recognizing {}", image_path.display()));

        self.state.ocr_log = format!("正在识别图片: {}...\n", label);
        self.state.status = StatusMessage::Info(format!("正在识别图片: {}...", label));
        self.pending = Some(spawn_recognition(
            OcrJob::new(image_path, api_key),
            self.settings.ocr.clone(),
        ));
    }

    /// Check the recognition in flight and apply its outcome once it arrives.
    fn poll_recognition(&mut self) {
        let Some(receiver) = &self.pending else {
            return;
        };

        match receiver.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                self.apply_outcome(outcome);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.state.status = StatusMessage::Error("识别线程意外退出。".to_string());
            }
        }
    }

    fn apply_outcome(&mut self, outcome: OcrOutcome) {
        let elapsed = chrono::Local::now() - outcome.job.submitted_at;
        crate::log(&format!(
            "GUI: Recognition of {} finished after {} ms",
            outcome.job.image_path.display(),
            elapsed.num_milliseconds()
        ));

        match outcome.result {
            Ok(recognition) => {
                self.state
                    .ocr_log
                    .push_str(&format!("\n原始识别文字:\n{}\n\n", recognition.text));

                if recognition.counts.is_empty() {
                    self.state.ocr_log.push_str("图片中未找到有效词条。\n");
                    self.state.status = StatusMessage::Info("识别完成，未找到有效词条。".to_string());
                } else {
                    self.store.merge(&recognition.counts);
                    self.state.ocr_log.push_str(&format!(
                        "本次识别到的词条:\n  {}\n",
                        format_counts_summary(&recognition.counts)
                    ));
                    self.state.status =
                        StatusMessage::Success("识别成功！已更新统计数据。".to_string());
                }
            }
            Err(e) => {
                self.state
                    .ocr_log
                    .push_str(&format!("\n识别失败:\n{}\n", e));
                let prefix = if e.is_transport() { "网络错误" } else { "识别失败" };
                self.state.status = StatusMessage::Error(format!("{}: {}", prefix, e));
            }
        }
    }

    /// Handle an attribute button click.
    fn handle_attribute_click(&mut self, attribute: Attribute) {
        self.store.increment(attribute, 1);
        self.history.push(attribute);
        self.state.status = StatusMessage::Info(format!("已记录: {}", attribute.label()));
    }

    /// Handle undo button click.
    fn handle_undo(&mut self) {
        if self.history.is_empty() {
            self.state.status = StatusMessage::Info("没有操作可以回退。".to_string());
            return;
        }

        if let Some(op) = self.history.pop() {
            self.store.decrement(op.attribute, 1);
            self.state.status = StatusMessage::Info(format!(
                "已回退: {} ({})",
                op.attribute.label(),
                op.at.format("%H:%M:%S")
            ));
        }
    }

    /// Handle save statistics button click.
    fn handle_save_stats(&mut self) {
        let path = self.settings.stats_path();
        match self.store.save(&path) {
            Ok(()) => {
                self.state.status =
                    StatusMessage::Success(format!("统计数据已保存到 {}。", path.display()));
            }
            Err(e) => {
                crate::log(&format!("GUI: Failed to save statistics: {:#}", e));
                self.state.status = StatusMessage::Error(format!("保存失败: {}", e));
            }
        }
    }

    /// Handle clear statistics button click.
    fn handle_clear(&mut self) {
        self.store.clear();
        self.history.clear();
        self.state.ocr_log.clear();
        self.state.image_path_input.clear();
        self.state.status = StatusMessage::Info("统计数据已清空。".to_string());
        crate::log("GUI: Statistics cleared");
    }
}

/// File name for status messages, falling back to the full path.
fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.poll_recognition();

        // Keep polling while a recognition is in flight
        if self.pending.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render::render_status(ui, &self.state);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("鸣潮声骸词条统计器");
            ui.add_space(8.0);
            render::render_panel_tabs(ui, &mut self.state);
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                let panel = self.state.panel;
                match panel {
                    Panel::Ocr => {
                        if render::render_api_key(ui, &mut self.state) {
                            self.handle_save_api_key();
                        }
                        let busy = self.pending.is_some();
                        if render::render_image_controls(ui, &mut self.state, busy) {
                            self.handle_recognize();
                        }
                    }
                    Panel::Manual => {
                        if let Some(attribute) = render::render_attribute_buttons(ui) {
                            self.handle_attribute_click(attribute);
                        }
                    }
                }

                let actions = render::render_stats_actions(
                    ui,
                    &mut self.state,
                    self.history.len(),
                    panel == Panel::Manual,
                );
                if actions.undo {
                    self.handle_undo();
                }
                if actions.save {
                    self.handle_save_stats();
                }
                if actions.clear {
                    self.handle_clear();
                }

                render::render_stats_table(
                    ui,
                    &self.store,
                    self.state.sort_mode,
                    panel == Panel::Ocr,
                );

                if panel == Panel::Ocr {
                    render::render_ocr_log(ui, &self.state);
                }
            });
        });
    }
}

/// Run the GUI application.
/// This function blocks until the window is closed.
pub fn run_gui(settings: AppSettings, store: StatsStore) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(640.0, 720.0))
            .with_min_inner_size(Vec2::new(480.0, 480.0))
            .with_title("鸣潮声骸词条统计器"),
        ..Default::default()
    };

    crate::log("GUI: Calling eframe::run_native...");

    eframe::run_native(
        "Echo Sub-stat Tracker",
        options,
        Box::new(move |cc| {
            crate::log("GUI: Creating GuiApp instance...");
            Ok(Box::new(GuiApp::new(cc, settings, store)))
        }),
    )
}

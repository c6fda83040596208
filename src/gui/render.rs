//! GUI rendering functions.
//!
//! Contains UI layout and component rendering logic.

use eframe::egui::{self, Color32, RichText, Vec2};

use super::state::{GuiState, Panel, StatusMessage};
use crate::attributes::Attribute;
use crate::stats::{SortMode, StatsStore};

/// Buttons shared by both panels below the statistics controls.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsActions {
    pub undo: bool,
    pub save: bool,
    pub clear: bool,
}

/// Render the panel selector.
pub fn render_panel_tabs(ui: &mut egui::Ui, state: &mut GuiState) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.panel, Panel::Ocr, "📷 截图识别");
        ui.selectable_value(&mut state.panel, Panel::Manual, "🖱 手动记录");
    });
}

/// Render the API key entry.
/// Returns true if the save button was clicked.
pub fn render_api_key(ui: &mut egui::Ui, state: &mut GuiState) -> bool {
    let mut save_clicked = false;

    ui.horizontal(|ui| {
        ui.label("OCR.space API Key:");
        ui.add(
            egui::TextEdit::singleline(&mut state.api_key_input)
                .password(true)
                .desired_width(260.0),
        );
        if ui.button("保存 API Key").clicked() {
            save_clicked = true;
        }
    });

    save_clicked
}

/// Render the image path entry and the recognize button.
/// Returns true if recognition was requested.
pub fn render_image_controls(ui: &mut egui::Ui, state: &mut GuiState, busy: bool) -> bool {
    let mut recognize_clicked = false;

    ui.horizontal(|ui| {
        ui.label("图片:");
        ui.add(
            egui::TextEdit::singleline(&mut state.image_path_input)
                .hint_text("输入路径或将截图拖入窗口")
                .desired_width(ui.available_width() - 120.0),
        );

        ui.add_enabled_ui(!busy, |ui| {
            if ui.button("▶ 识别").clicked() {
                recognize_clicked = true;
            }
        });

        if busy {
            ui.spinner();
        }
    });

    recognize_clicked
}

/// Render one button per attribute, four per row.
/// Returns the attribute whose button was clicked.
pub fn render_attribute_buttons(ui: &mut egui::Ui) -> Option<Attribute> {
    let mut clicked = None;

    egui::Grid::new("attribute_buttons")
        .spacing(Vec2::new(8.0, 8.0))
        .show(ui, |ui| {
            for (i, attribute) in Attribute::ALL.into_iter().enumerate() {
                let button = egui::Button::new(RichText::new(attribute.label()).size(15.0));
                if ui.add_sized([110.0, 32.0], button).clicked() {
                    clicked = Some(attribute);
                }
                if i % 4 == 3 {
                    ui.end_row();
                }
            }
        });

    clicked
}

/// Render the sort selector and the undo/save/clear buttons.
/// `undo_depth` is how many clicks can still be undone.
pub fn render_stats_actions(
    ui: &mut egui::Ui,
    state: &mut GuiState,
    undo_depth: usize,
    show_undo: bool,
) -> StatsActions {
    let mut actions = StatsActions::default();

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        if show_undo {
            ui.add_enabled_ui(undo_depth > 0, |ui| {
                if ui.button(format!("↩ 回退上一条操作 ({})", undo_depth)).clicked() {
                    actions.undo = true;
                }
            });
        }

        if ui.button("💾 保存统计").clicked() {
            actions.save = true;
        }
        if ui.button("🗑 清空统计").clicked() {
            actions.clear = true;
        }

        ui.add_space(20.0);

        egui::ComboBox::from_label("排序")
            .selected_text(state.sort_mode.label())
            .show_ui(ui, |ui| {
                for mode in SortMode::ALL {
                    ui.selectable_value(&mut state.sort_mode, mode, mode.label());
                }
            });
    });

    actions
}

/// Render the statistics table with count and share per attribute.
/// With `hide_zero`, attributes never seen are left out.
pub fn render_stats_table(ui: &mut egui::Ui, store: &StatsStore, sort: SortMode, hide_zero: bool) {
    ui.add_space(8.0);

    if hide_zero && store.is_empty() {
        ui.label("当前统计为空。请载入图片进行识别。");
        return;
    }

    egui::Grid::new("stats_table")
        .striped(true)
        .num_columns(3)
        .min_col_width(120.0)
        .show(ui, |ui| {
            ui.label(RichText::new("声骸词条").strong());
            ui.label(RichText::new("出现次数").strong());
            ui.label(RichText::new("出现比例").strong());
            ui.end_row();

            for row in store.rows(sort) {
                if hide_zero && row.count == 0 {
                    continue;
                }
                ui.label(row.attribute.name());
                ui.label(row.count.to_string());
                ui.label(format!("{:.2}%", row.share * 100.0));
                ui.end_row();
            }

            ui.label(RichText::new("总计").strong());
            ui.label(RichText::new(store.total().to_string()).strong());
            ui.label("");
            ui.end_row();
        });
}

/// Render the raw OCR text and findings of the latest recognition.
pub fn render_ocr_log(ui: &mut egui::Ui, state: &GuiState) {
    if state.ocr_log.is_empty() {
        return;
    }

    ui.add_space(8.0);
    ui.separator();
    ui.label(RichText::new("识别结果").strong());

    egui::ScrollArea::vertical()
        .max_height(220.0)
        .show(ui, |ui| {
            let mut text = state.ocr_log.as_str();
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .font(egui::TextStyle::Monospace)
                    .desired_width(f32::INFINITY),
            );
        });
}

/// Render the status line.
pub fn render_status(ui: &mut egui::Ui, state: &GuiState) {
    let color = match &state.status {
        StatusMessage::Ready => Color32::GRAY,
        StatusMessage::Info(_) => Color32::from_rgb(0, 120, 200),
        StatusMessage::Success(_) => Color32::from_rgb(0, 150, 0),
        StatusMessage::Error(_) => Color32::from_rgb(200, 0, 0),
    };

    ui.horizontal(|ui| {
        ui.label("状态:");
        ui.label(RichText::new(state.status.text()).color(color));
    });
}

use super::*;

impl Console {
    pub(super) fn render_header(&mut self, ui: &mut Ui, store: &MixerStore) {
        let doc = store.document();

        ui.horizontal(|ui| {
            if let Some(index) = self.selected {
                if ui.button("< Back").clicked() {
                    self.selected = None;
                }
                ui.label(RichText::new(format!("Effects: {}", channel_label(index))).strong());
            } else {
                ui.heading("Mixer Console");
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Start Inferencing").clicked() {
                    self.show_inference = true;
                }

                ui.separator();
                render_connection(ui, doc);

                ui.separator();
                let (text, color) = if doc.hw_init_ready {
                    ("HW ready", Color32::from_rgb(80, 200, 120))
                } else {
                    ("HW initializing", Color32::from_gray(140))
                };
                ui.label(RichText::new(text).small().color(color));

                if doc.soloing_active {
                    ui.separator();
                    ui.label(
                        RichText::new("SOLO")
                            .small()
                            .strong()
                            .color(Color32::from_rgb(255, 210, 0)),
                    );
                }
            });
        });
    }
}

fn render_connection(ui: &mut Ui, doc: &MixerDocument) {
    let status = doc.connection_status;
    let color = match status {
        mixconsole_types::ConnectionStatus::Connected => Color32::from_rgb(80, 200, 120),
        mixconsole_types::ConnectionStatus::Connecting => Color32::from_rgb(255, 200, 0),
        mixconsole_types::ConnectionStatus::Disconnected => Color32::from_rgb(220, 70, 70),
    };
    ui.label(RichText::new(status.description()).small().color(color));
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, color);
}

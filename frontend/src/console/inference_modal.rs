use super::*;

impl Console {
    /// Guided record-and-infer dialog.
    pub(super) fn render_inference_dialog(
        &mut self,
        ctx: &Context,
        store: &mut MixerStore,
        workflow: &mut InferenceWorkflow,
    ) {
        let now = store.now();
        let stage = store.document().inferencing_state;
        let mut open = true;
        let mut close_clicked = false;

        egui::Window::new("Inferencing")
            .id(egui::Id::new("inference_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.set_width(360.0);
                ui.vertical_centered(|ui| {
                    match stage {
                        InferencingState::Idle => {
                            ui.label(
                                "Prepare to play a representative 6-second snippet of your \
                                 performance. The console will record it and infer a mix.",
                            );
                            ui.add_space(4.0);
                            ui.label(
                                RichText::new("Click start for the 5-second countdown.")
                                    .color(Color32::from_gray(170)),
                            );
                            ui.add_space(8.0);
                            if ui.button("Start Countdown").clicked() {
                                workflow.start(store, now);
                            }
                        }
                        InferencingState::Countdown => {
                            ui.label(RichText::new("Get Ready!").heading());
                            if let Some(seconds) = workflow.countdown_remaining(now) {
                                ui.label(
                                    RichText::new(seconds.to_string())
                                        .size(48.0)
                                        .strong()
                                        .color(Color32::from_rgb(255, 210, 0)),
                                );
                            }
                            ui.label("Start playing now!");
                        }
                        InferencingState::Recording => {
                            ui.label(
                                RichText::new("RECORDING AUDIO (6 seconds)")
                                    .strong()
                                    .color(Color32::from_rgb(220, 60, 60)),
                            );
                        }
                        InferencingState::Inferencing => {
                            ui.label(RichText::new("Inferencing...").strong());
                            ui.label("Applying mix... (~20s)");
                            ui.label(
                                RichText::new("You can close this window.")
                                    .small()
                                    .color(Color32::from_gray(150)),
                            );
                        }
                    }

                    if stage != InferencingState::Idle {
                        ui.add_space(8.0);
                        let fraction = workflow.progress(now) / 100.0;
                        ui.add(egui::ProgressBar::new(fraction).show_percentage());
                    }

                    ui.add_space(8.0);
                    if ui.button("Close").clicked() {
                        close_clicked = true;
                    }
                });
            });

        if !open || close_clicked {
            self.show_inference = false;
            workflow.teardown();
        }
    }
}

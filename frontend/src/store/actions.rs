//! Write actions.
//!
//! Discrete controls (mute, solo, stereo, effect enables) are sent at once.
//! Continuous controls go through the throttle keyed by their path.
//! Values are assumed to be clamped by the caller.

use std::sync::Arc;

use mixconsole_types::{
    BandParam, Channel, ChannelField, CompressorParam, DistortionParam, DocField, DocPath, Effect,
    EffectParam, EqBandId, InferencingState, MixerDocument, PatchOp, PhaserParam, ReverbParam,
};
use serde_json::Value;

use super::MixerStore;

impl MixerStore {
    // ── Discrete ────────────────────────────────────────────────────

    pub fn set_muted(&mut self, index: usize, muted: bool) {
        if self.update_channel(index, |c| c.muted = muted) {
            self.send_now(DocPath::Field(index, ChannelField::Muted), muted.into());
        }
    }

    pub fn set_soloed(&mut self, index: usize, soloed: bool) {
        if self.update_channel(index, |c| c.soloed = soloed) {
            self.send_now(DocPath::Field(index, ChannelField::Soloed), soloed.into());
        }
    }

    pub fn set_stereo(&mut self, index: usize, stereo: bool) {
        if self.update_channel(index, |c| c.stereo = stereo) {
            self.send_now(DocPath::Field(index, ChannelField::Stereo), stereo.into());
        }
    }

    pub fn set_effect_enabled(&mut self, index: usize, effect: Effect, enabled: bool) {
        if self.update_channel(index, |c| *c.effect_enabled_mut(effect) = enabled) {
            self.send_now(DocPath::EffectEnabled(index, effect), enabled.into());
        }
    }

    pub fn set_eq_enabled(&mut self, index: usize, enabled: bool) {
        self.set_effect_enabled(index, Effect::Equalizer, enabled);
    }

    pub fn set_compressor_enabled(&mut self, index: usize, enabled: bool) {
        self.set_effect_enabled(index, Effect::Compressor, enabled);
    }

    pub fn set_distortion_enabled(&mut self, index: usize, enabled: bool) {
        self.set_effect_enabled(index, Effect::Distortion, enabled);
    }

    pub fn set_phaser_enabled(&mut self, index: usize, enabled: bool) {
        self.set_effect_enabled(index, Effect::Phaser, enabled);
    }

    pub fn set_reverb_enabled(&mut self, index: usize, enabled: bool) {
        self.set_effect_enabled(index, Effect::Reverb, enabled);
    }

    // ── Continuous ──────────────────────────────────────────────────

    pub fn set_panning(&mut self, index: usize, panning: f64) {
        if self.update_channel(index, |c| c.panning = panning) {
            self.throttled(DocPath::Field(index, ChannelField::Panning), panning);
        }
    }

    pub fn set_digital_gain(&mut self, index: usize, gain_db: f64) {
        if self.update_channel(index, |c| c.digital_gain = gain_db) {
            self.throttled(DocPath::Field(index, ChannelField::DigitalGain), gain_db);
        }
    }

    pub fn set_analog_gain(&mut self, index: usize, gain_db: f64) {
        if self.update_channel(index, |c| c.analog_gain = gain_db) {
            self.throttled(DocPath::Field(index, ChannelField::AnalogGain), gain_db);
        }
    }

    /// Any numeric effect parameter.
    pub fn set_effect_param(&mut self, index: usize, param: EffectParam, value: f64) {
        if self.update_channel(index, |c| *c.param_mut(param) = value) {
            self.throttled(DocPath::Param(index, param), value);
        }
    }

    pub fn set_eq_band_param(
        &mut self,
        index: usize,
        band: EqBandId,
        param: BandParam,
        value: f64,
    ) {
        self.set_effect_param(index, EffectParam::Eq(band, param), value);
    }

    pub fn set_compressor_param(&mut self, index: usize, param: CompressorParam, value: f64) {
        self.set_effect_param(index, EffectParam::Compressor(param), value);
    }

    pub fn set_distortion_param(&mut self, index: usize, param: DistortionParam, value: f64) {
        self.set_effect_param(index, EffectParam::Distortion(param), value);
    }

    pub fn set_phaser_param(&mut self, index: usize, param: PhaserParam, value: f64) {
        self.set_effect_param(index, EffectParam::Phaser(param), value);
    }

    pub fn set_reverb_param(&mut self, index: usize, param: ReverbParam, value: f64) {
        self.set_effect_param(index, EffectParam::Reverb(param), value);
    }

    // ── Inference workflow ──────────────────────────────────────────

    /// Request an inference workflow stage. Returns `false` if the request
    /// was rejected.
    ///
    /// `countdown` is only accepted from `idle` and is applied locally.
    /// `recording` is only accepted from `countdown` and is not applied
    /// locally; the server's push is authoritative. `inferencing` is never
    /// client-requestable.
    pub fn set_inferencing_state(&mut self, target: InferencingState) -> bool {
        let current = self.doc.inferencing_state;
        let optimistic = match (current, target) {
            (_, InferencingState::Inferencing) => {
                tracing::warn!("Clients cannot request the inferencing stage");
                return false;
            }
            (InferencingState::Idle, InferencingState::Countdown) => true,
            (InferencingState::Countdown, InferencingState::Recording) => false,
            (InferencingState::Idle, InferencingState::Idle) => return true,
            (InferencingState::Countdown, InferencingState::Idle) => true,
            (_, InferencingState::Idle) => false,
            (current, target) => {
                tracing::warn!("Ignoring {} request while {}", target, current);
                return false;
            }
        };

        if optimistic {
            let mut next = MixerDocument::clone(&self.doc);
            next.inferencing_state = target;
            self.commit(Arc::new(next));
        }
        tracing::info!("Requesting inferencing stage {}", target);
        self.send_now(
            DocPath::Root(DocField::InferencingState),
            Value::from(target.as_str()),
        );
        true
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// Optimistically edit one channel. Returns `false` if `index` does not
    /// address a channel, in which case nothing is changed or sent.
    fn update_channel(&mut self, index: usize, edit: impl FnOnce(&mut Channel)) -> bool {
        let mut next = MixerDocument::clone(&self.doc);
        let Some(channel) = next.channel_mut(index) else {
            tracing::warn!("Ignoring write to channel {}: out of range", index);
            return false;
        };
        edit(channel);
        if next.channels[index] != self.doc.channels[index] {
            self.commit(Arc::new(next));
        }
        true
    }

    fn send_now(&self, path: DocPath, value: Value) {
        self.transport.send(vec![PatchOp::replace(path, value)]);
    }

    fn throttled(&mut self, path: DocPath, value: f64) {
        let now = self.clock.now();
        self.dispatcher
            .schedule(path, Value::from(value), now, self.transport.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::ManualClock;
    use crate::transport::MemoryTransport;
    use mixconsole_types::ServerUpdate;
    use serde_json::json;
    use std::time::Duration;

    fn store() -> (MixerStore, MemoryTransport, ManualClock) {
        let transport = MemoryTransport::new();
        let clock = ManualClock::new();
        let store = MixerStore::new(transport.clone()).with_clock(clock.clone());
        (store, transport, clock)
    }

    #[test]
    fn test_discrete_actions_send_immediately() {
        let (mut store, transport, _) = store();
        store.set_soloed(3, true);
        store.set_stereo(0, false);
        store.set_compressor_enabled(5, true);

        assert!(store.document().channels[3].soloed);
        assert!(!store.document().master().stereo);
        assert!(store.document().channels[5].compressor.enabled);
        assert_eq!(
            transport.take(),
            vec![
                vec![PatchOp::replace("/channels/3/soloed", true)],
                vec![PatchOp::replace("/channels/0/stereo", false)],
                vec![PatchOp::replace("/channels/5/compressor/enabled", true)],
            ]
        );
        // soloing_active stays server-owned
        assert!(!store.document().soloing_active);
    }

    #[test]
    fn test_out_of_range_channel_is_ignored() {
        let (mut store, transport, _) = store();
        let before = Arc::clone(store.document());

        store.set_muted(9, true);
        store.set_panning(42, 0.3);

        assert!(Arc::ptr_eq(&before, store.document()));
        assert!(transport.is_empty());
        assert!(store.next_deadline().is_none());
    }

    #[test]
    fn test_effect_params_use_wire_paths() {
        let (mut store, transport, clock) = store();
        store.set_eq_band_param(2, EqBandId::LowShelf, BandParam::CutoffFreq, 120.0);
        store.set_compressor_param(2, CompressorParam::MakeupGainDb, 3.0);
        store.set_distortion_param(2, DistortionParam::Drive, 0.4);
        store.set_phaser_param(2, PhaserParam::Depth, 70.0);
        store.set_reverb_param(0, ReverbParam::WetLevel, 40.0);

        let channel = &store.document().channels[2];
        assert_eq!(channel.equalizer.low_shelf.cutoff_freq, 120.0);
        assert_eq!(channel.compressor.makeup_gain_db, 3.0);
        assert_eq!(channel.distortion.drive, 0.4);
        assert_eq!(channel.phaser.depth, 70.0);
        assert_eq!(store.document().master().reverb.wet_level, 40.0);

        let paths: Vec<String> = transport
            .take()
            .iter()
            .map(|batch| batch[0].path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/channels/2/equalizer/lowShelf/cutoff_freq",
                "/channels/2/compressor/makeup_gain_db",
                "/channels/2/distortion/drive",
                "/channels/2/phaser/depth",
                "/channels/0/reverb/wet_level",
            ]
        );

        clock.advance(Duration::from_millis(25));
        store.tick();
        assert!(transport.is_empty());
    }

    #[test]
    fn test_optimistic_write_touches_one_channel() {
        let (mut store, _, _) = store();
        let before = Arc::clone(store.document());
        store.set_analog_gain(6, 12.0);

        let after = store.document();
        assert_eq!(after.channels[6].analog_gain, 12.0);
        assert!(!Arc::ptr_eq(&before.channels[6], &after.channels[6]));
        for index in (0..9).filter(|i| *i != 6) {
            assert!(Arc::ptr_eq(&before.channels[index], &after.channels[index]));
        }
    }

    #[test]
    fn test_countdown_only_from_idle() {
        let (mut store, transport, _) = store();

        assert!(store.set_inferencing_state(InferencingState::Countdown));
        assert_eq!(store.document().inferencing_state, InferencingState::Countdown);
        assert_eq!(
            transport.take(),
            vec![vec![PatchOp::replace("/inferencing_state", "countdown")]]
        );

        assert!(!store.set_inferencing_state(InferencingState::Countdown));
        assert!(transport.is_empty());
    }

    #[test]
    fn test_recording_request_is_not_optimistic() {
        let (mut store, transport, _) = store();
        store.set_inferencing_state(InferencingState::Countdown);
        transport.take();

        assert!(store.set_inferencing_state(InferencingState::Recording));
        assert_eq!(store.document().inferencing_state, InferencingState::Countdown);
        assert_eq!(
            transport.take(),
            vec![vec![PatchOp::replace("/inferencing_state", "recording")]]
        );

        store.apply_server_update(ServerUpdate::Patch(vec![PatchOp::replace(
            "/inferencing_state",
            json!("recording"),
        )]));
        assert_eq!(store.document().inferencing_state, InferencingState::Recording);
    }

    #[test]
    fn test_inferencing_never_requestable() {
        let (mut store, transport, _) = store();
        assert!(!store.set_inferencing_state(InferencingState::Inferencing));
        assert!(!store.set_inferencing_state(InferencingState::Recording));
        assert!(transport.is_empty());
        assert_eq!(store.document().inferencing_state, InferencingState::Idle);
    }

    #[test]
    fn test_cancel_from_countdown() {
        let (mut store, transport, _) = store();
        store.set_inferencing_state(InferencingState::Countdown);
        transport.take();

        assert!(store.set_inferencing_state(InferencingState::Idle));
        assert_eq!(store.document().inferencing_state, InferencingState::Idle);
        assert_eq!(
            transport.take(),
            vec![vec![PatchOp::replace("/inferencing_state", "idle")]]
        );

        // Already idle: nothing to send.
        assert!(store.set_inferencing_state(InferencingState::Idle));
        assert!(transport.is_empty());
    }
}

//! Plays what the simulation's mixer asks for.
//!
//! Each emitter gets at most one audio entity. A new generation or clip respawns
//! it; volume and speed follow the channel every frame.

use std::time::Duration;

use bevy::{
    audio::{AddAudioSource, AudioPlayer, AudioSink, AudioSinkPlayback, Decodable, Source, Volume},
    platform::collections::HashMap,
    prelude::*,
};
use sim::audio::voices::{COLLISION_TONE, HORN_TONE};
use sim::audio::SynthTone;
use sim::world::radio::RADIO_STATIONS;
use sim::{Channel, Clip, Emitter};

use crate::session::{SimSession, SimSet};
use crate::state::AppState;

const ENGINE_LOOP: &str = "sounds/engine.mp3";
const TV_SOUNDTRACK: &str = "sounds/tv.mp3";
const SAMPLE_RATE: u32 = 44_100;

pub(super) fn plugin(app: &mut App) {
    app.add_audio_source::<SynthVoice>();
    app.init_resource::<EmitterSinks>();
    app.add_systems(OnEnter(AppState::Playing), load_sounds);
    app.add_systems(
        Update,
        (report_audio_loaded, reconcile_sinks).in_set(SimSet::Present),
    );
}

/// Additive tone rendered on the fly from a [`SynthTone`].
#[derive(Asset, TypePath, Clone, Copy, Debug)]
pub struct SynthVoice {
    tone: SynthTone,
}

pub struct SynthDecoder {
    tone: SynthTone,
    /// Harmonics below Nyquist with their amplitudes normalized to a unit sum.
    partials: Vec<(f32, f32)>,
    drive: f32,
    sample: u64,
}

impl SynthDecoder {
    fn new(tone: SynthTone) -> Self {
        let nyquist = SAMPLE_RATE as f32 / 2.0;
        let mut partials: Vec<(f32, f32)> = tone
            .partials
            .iter()
            .enumerate()
            .map(|(i, a)| (tone.frequency * (i + 1) as f32, *a))
            .filter(|(f, _)| *f < nyquist)
            .collect();
        let total: f32 = partials.iter().map(|(_, a)| a.abs()).sum();
        if total > 0.0 {
            for (_, a) in &mut partials {
                *a /= total;
            }
        }
        Self {
            tone,
            partials,
            drive: 1.0 + tone.distortion * 10.0,
            sample: 0,
        }
    }

    fn shape(&self, x: f32) -> f32 {
        if self.tone.distortion <= 0.0 {
            x
        } else {
            (self.drive * x).tanh() / self.drive.tanh()
        }
    }
}

impl Iterator for SynthDecoder {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.sample as f64 / f64::from(SAMPLE_RATE);
        self.sample += 1;
        let x: f64 = self
            .partials
            .iter()
            .map(|(f, a)| f64::from(*a) * (std::f64::consts::TAU * f64::from(*f) * t).sin())
            .sum();
        Some(self.shape(x as f32))
    }
}

impl Source for SynthDecoder {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Decodable for SynthVoice {
    type DecoderItem = <SynthDecoder as Iterator>::Item;
    type Decoder = SynthDecoder;

    fn decoder(&self) -> Self::Decoder {
        SynthDecoder::new(self.tone)
    }
}

#[derive(Resource)]
struct Sounds {
    engine: Handle<AudioSource>,
    stations: Vec<Handle<AudioSource>>,
    tv: Handle<AudioSource>,
    horn: Handle<SynthVoice>,
    collision: Handle<SynthVoice>,
    reported: bool,
}

/// Audio entity currently playing for each emitter.
#[derive(Resource, Default)]
struct EmitterSinks(HashMap<Emitter, (Entity, Clip, u32)>);

fn load_sounds(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut voices: ResMut<Assets<SynthVoice>>,
) {
    commands.insert_resource(Sounds {
        engine: asset_server.load(ENGINE_LOOP),
        stations: RADIO_STATIONS.iter().map(|p| asset_server.load(*p)).collect(),
        tv: asset_server.load(TV_SOUNDTRACK),
        horn: voices.add(SynthVoice { tone: HORN_TONE }),
        collision: voices.add(SynthVoice {
            tone: COLLISION_TONE,
        }),
        reported: false,
    });
}

/// Tells the world once the radio stations can be decoded.
fn report_audio_loaded(
    mut sounds: ResMut<Sounds>,
    asset_server: Res<AssetServer>,
    mut session: ResMut<SimSession>,
) {
    if sounds.reported {
        return;
    }
    if sounds
        .stations
        .iter()
        .all(|h| asset_server.is_loaded_with_dependencies(h))
    {
        sounds.reported = true;
        session.audio_loaded();
        info!("radio stations loaded");
    }
}

fn playback_settings(channel: &Channel) -> PlaybackSettings {
    let mode = if channel.looping {
        PlaybackSettings::LOOP
    } else {
        PlaybackSettings::ONCE
    };
    mode.with_volume(sink_volume(channel))
        .with_speed(channel.playback_rate)
}

/// Sinks can't invert phase, so a negative gain plays at its magnitude.
fn sink_volume(channel: &Channel) -> Volume {
    Volume::Linear(channel.volume().abs())
}

fn spawn_player(commands: &mut Commands, sounds: &Sounds, emitter: Emitter, channel: &Channel) -> Entity {
    let settings = playback_settings(channel);
    let name = Name::new(format!("{emitter:?} audio"));
    match channel.clip {
        Clip::EngineLoop => commands
            .spawn((AudioPlayer(sounds.engine.clone()), settings, name))
            .id(),
        Clip::TvSoundtrack => commands
            .spawn((AudioPlayer(sounds.tv.clone()), settings, name))
            .id(),
        Clip::Station(i) => {
            let handle = sounds
                .stations
                .get(i)
                .cloned()
                .unwrap_or_default();
            commands.spawn((AudioPlayer(handle), settings, name)).id()
        }
        Clip::Horn => commands
            .spawn((AudioPlayer(sounds.horn.clone()), settings, name))
            .id(),
        Clip::CollisionThud => commands
            .spawn((AudioPlayer(sounds.collision.clone()), settings, name))
            .id(),
    }
}

fn reconcile_sinks(
    mut commands: Commands,
    mut session: ResMut<SimSession>,
    sounds: Res<Sounds>,
    mut sinks: ResMut<EmitterSinks>,
    mut playing: Query<&mut AudioSink>,
) {
    for event in session.mixer_mut().drain_events() {
        debug!("audio: {event:?}");
    }

    for (emitter, channel) in session.mixer().channels() {
        let current = sinks.0.get(&emitter).copied();
        match current {
            Some((entity, clip, generation))
                if channel.playing && clip == channel.clip && generation == channel.generation =>
            {
                if let Ok(mut sink) = playing.get_mut(entity) {
                    sink.set_volume(sink_volume(channel));
                    sink.set_speed(channel.playback_rate);
                }
            }
            _ => {
                if let Some((entity, ..)) = current {
                    commands.entity(entity).despawn();
                    sinks.0.remove(&emitter);
                }
                if channel.playing {
                    let entity = spawn_player(&mut commands, &sounds, emitter, channel);
                    sinks
                        .0
                        .insert(emitter, (entity, channel.clip, channel.generation));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synth_output_stays_in_range() {
        let mut decoder = SynthDecoder::new(HORN_TONE);
        for _ in 0..4_410 {
            let s = decoder.next().unwrap();
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn partials_above_nyquist_are_dropped() {
        let decoder = SynthDecoder::new(HORN_TONE);
        assert!(decoder.partials.len() < HORN_TONE.partials.len());
        assert!(
            decoder
                .partials
                .iter()
                .all(|(f, _)| *f < SAMPLE_RATE as f32 / 2.0)
        );
    }
}

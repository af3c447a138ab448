//! The block renderer: applies queued commands, then sums every voice.

use std::mem;

use crate::core::bank::VoiceBank;
use crate::core::voice::{PhaseWrap, Voice};
use crate::core::waveform::WaveformTable;
use crate::messaging::{
    message_bus, CommandQueue, EngineCommand, EngineHandle, DEFAULT_QUEUE_CAPACITY,
};

pub const DEFAULT_FREQUENCY: f32 = 440.0;
pub const DEFAULT_VOLUME: f32 = 0.5;
/// Master gain while only the main tone can sound.
pub const MONO_GAIN: f32 = 0.5;
/// Master gain once note voices are in play; many voices summed need headroom.
pub const POLY_GAIN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Monophonic,
    Polyphonic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub main_frequency: f32,
    pub main_volume: f32,
    pub mono_gain: f32,
    pub poly_gain: f32,
    pub phase_wrap: PhaseWrap,
    pub queue_capacity: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            main_frequency: DEFAULT_FREQUENCY,
            main_volume: DEFAULT_VOLUME,
            mono_gain: MONO_GAIN,
            poly_gain: POLY_GAIN,
            phase_wrap: PhaseWrap::Reset,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Frequency in Hz to per-sample phase increment.
pub fn phase_step(frequency: f32, sample_rate: f32) -> f32 {
    frequency / sample_rate
}

/// Polyphonic wavetable oscillator bank.
///
/// The engine owns its waveform and voices outright. Other threads talk to it
/// only through the [`EngineHandle`] returned by [`Engine::new`]; their
/// commands are applied at the start of the next [`Engine::render`] call.
pub struct Engine {
    state: EngineState,
    commands: CommandQueue,
}

struct EngineState {
    sample_rate: f32,
    table: WaveformTable,
    bank: VoiceBank,
    mode: EngineMode,
    master_gain: f32,
    mono_gain: f32,
    poly_gain: f32,
    phase_wrap: PhaseWrap,
}

impl Engine {
    pub fn new(config: EngineConfig) -> (Self, EngineHandle) {
        let (handle, commands) = message_bus(config.queue_capacity);
        let main = Voice::main(
            phase_step(config.main_frequency, config.sample_rate),
            config.main_volume,
        );
        let engine = Engine {
            state: EngineState {
                sample_rate: config.sample_rate,
                table: WaveformTable::silent(),
                bank: VoiceBank::new(main),
                mode: EngineMode::Monophonic,
                master_gain: config.mono_gain,
                mono_gain: config.mono_gain,
                poly_gain: config.poly_gain,
                phase_wrap: config.phase_wrap,
            },
            commands,
        };
        (engine, handle)
    }

    /// Fill `block` with the next samples.
    ///
    /// Pending commands are applied first, so the whole block sees one
    /// consistent table and voice set. Output is not clipped. Never allocates
    /// and never blocks.
    pub fn render(&mut self, block: &mut [f32]) {
        self.process_commands();

        let state = &mut self.state;
        let master_gain = state.master_gain;
        let wrap = state.phase_wrap;
        for out in block.iter_mut() {
            let mut sample = 0.0;
            for voice in state.bank.voices_mut() {
                sample += voice.sample(&state.table) * master_gain;
                voice.advance(wrap);
            }
            *out = sample;
        }
    }

    /// Apply every queued command. Returns how many were applied.
    pub fn process_commands(&mut self) -> usize {
        let (state, commands) = (&mut self.state, &self.commands);
        commands.drain(|command| state.apply(command, commands))
    }

    /// Apply one command immediately, bypassing the queue.
    pub fn apply(&mut self, command: EngineCommand) {
        self.state.apply(command, &self.commands);
    }

    pub fn sample_rate(&self) -> f32 {
        self.state.sample_rate
    }

    pub fn table(&self) -> &WaveformTable {
        &self.state.table
    }

    pub fn voices(&self) -> &VoiceBank {
        &self.state.bank
    }

    pub fn mode(&self) -> EngineMode {
        self.state.mode
    }

    pub fn master_gain(&self) -> f32 {
        self.state.master_gain
    }
}

impl EngineState {
    fn apply(&mut self, command: EngineCommand, retired: &CommandQueue) {
        // Commands normally arrive validated; anything that slipped past is dropped.
        let Ok(command) = command.validated() else {
            return;
        };

        match command {
            EngineCommand::ReplaceWaveform(table) => {
                let old = mem::replace(&mut self.table, table);
                retired.retire(old);
            }
            EngineCommand::SetMainFrequency(frequency) => {
                self.bank
                    .set_main_phase_step(phase_step(frequency, self.sample_rate));
                self.enter_monophonic();
            }
            EngineCommand::SetMainVolume(volume) => {
                self.bank.set_main_gain(volume);
                self.enter_monophonic();
            }
            EngineCommand::NoteOn { channel, note, frequency, volume } => {
                let step = phase_step(frequency, self.sample_rate);
                if self.bank.note_on(channel, note, step, volume) {
                    self.mode = EngineMode::Polyphonic;
                    self.master_gain = self.poly_gain;
                }
            }
            EngineCommand::NoteOff { channel, note } => self.bank.note_off(channel, note),
            EngineCommand::ResetMonophonic => self.enter_monophonic(),
        }
    }

    fn enter_monophonic(&mut self) {
        self.bank.reset_to_monophonic();
        self.mode = EngineMode::Monophonic;
        self.master_gain = self.mono_gain;
    }
}

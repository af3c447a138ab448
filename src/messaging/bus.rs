use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use log::{debug, warn};

use super::{CommandError, EngineCommand};
use crate::core::waveform::{ControlPoint, WaveformTable};

/// Default depth of the control-to-audio queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Create a connected control handle and audio-side queue.
///
/// The command queue is bounded. When it is full, the newest command is
/// dropped and the sender gets [`CommandError::QueueFull`]; the audio side is
/// never made to wait. The retired-table channel gets the same depth, so every
/// table swapped out while draining a full queue finds room on the way back.
pub fn message_bus(capacity: usize) -> (EngineHandle, CommandQueue) {
    let capacity = capacity.max(1);
    let (sender, receiver) = bounded(capacity);
    let (retired_sender, retired_receiver) = bounded(capacity);
    (
        EngineHandle {
            sender,
            retired: retired_receiver,
        },
        CommandQueue {
            receiver,
            retired: retired_sender,
            capacity,
        },
    )
}

/// Control-side half: validates commands and queues them for the engine.
#[derive(Clone)]
pub struct EngineHandle {
    sender: Sender<EngineCommand>,
    retired: Receiver<WaveformTable>,
}

impl EngineHandle {
    /// Validate and enqueue a command without blocking.
    pub fn send(&self, command: EngineCommand) -> Result<(), CommandError> {
        let command = command.validated()?;
        if matches!(command, EngineCommand::ReplaceWaveform(_)) {
            self.collect_retired();
        }
        match self.sender.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                warn!("command queue full, dropping {dropped:?}");
                Err(CommandError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(CommandError::Disconnected),
        }
    }

    /// Validate `points` as a waveform and queue it. On error the engine keeps
    /// its current table.
    pub fn replace_waveform(&self, points: Vec<ControlPoint>) -> Result<(), CommandError> {
        let table = WaveformTable::new(points)?;
        self.set_waveform(table)
    }

    pub fn set_waveform(&self, table: WaveformTable) -> Result<(), CommandError> {
        self.send(EngineCommand::ReplaceWaveform(table))
    }

    pub fn set_main_frequency(&self, frequency: f32) -> Result<(), CommandError> {
        self.send(EngineCommand::SetMainFrequency(frequency))
    }

    pub fn set_main_volume(&self, volume: f32) -> Result<(), CommandError> {
        self.send(EngineCommand::SetMainVolume(volume))
    }

    pub fn note_on(
        &self,
        channel: u8,
        note: u8,
        frequency: f32,
        volume: f32,
    ) -> Result<(), CommandError> {
        self.send(EngineCommand::NoteOn {
            channel,
            note,
            frequency,
            volume,
        })
    }

    pub fn note_off(&self, channel: u8, note: u8) -> Result<(), CommandError> {
        self.send(EngineCommand::NoteOff { channel, note })
    }

    pub fn reset_monophonic(&self) -> Result<(), CommandError> {
        self.send(EngineCommand::ResetMonophonic)
    }

    /// Commands sent but not yet picked up by the engine
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Free tables the engine has swapped out. Returns how many were freed.
    pub fn collect_retired(&self) -> usize {
        let freed = self.retired.try_iter().count();
        if freed > 0 {
            debug!("freed {freed} retired waveform table(s)");
        }
        freed
    }
}

/// Audio-side half, owned by the engine.
pub struct CommandQueue {
    receiver: Receiver<EngineCommand>,
    retired: Sender<WaveformTable>,
    capacity: usize,
}

impl CommandQueue {
    /// Hand every queued command to `apply`, oldest first.
    ///
    /// At most `capacity` commands are taken per call, which covers everything
    /// that was queued when the call began.
    pub fn drain(&self, mut apply: impl FnMut(EngineCommand)) -> usize {
        let mut count = 0;
        while count < self.capacity {
            match self.receiver.try_recv() {
                Ok(command) => {
                    apply(command);
                    count += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        count
    }

    /// Pass a replaced table back to the control side to be freed there. The
    /// channel only fills up if the handle stops collecting.
    pub fn retire(&self, table: WaveformTable) {
        let _ = self.retired.try_send(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_send_order() {
        let (handle, queue) = message_bus(8);
        handle.set_main_frequency(220.0).unwrap();
        handle.note_on(2, 60, 261.6, 0.5).unwrap();
        handle.note_off(2, 60).unwrap();

        let mut seen = Vec::new();
        assert_eq!(queue.drain(|cmd| seen.push(cmd)), 3);
        assert_eq!(
            seen,
            vec![
                EngineCommand::SetMainFrequency(220.0),
                EngineCommand::NoteOn { channel: 2, note: 60, frequency: 261.6, volume: 0.5 },
                EngineCommand::NoteOff { channel: 2, note: 60 },
            ]
        );
        assert_eq!(queue.drain(|_| panic!("queue should be empty")), 0);
    }

    #[test]
    fn full_queue_drops_newest() {
        let (handle, queue) = message_bus(2);
        handle.set_main_volume(0.1).unwrap();
        handle.set_main_volume(0.2).unwrap();
        assert_eq!(handle.set_main_volume(0.3), Err(CommandError::QueueFull));
        assert_eq!(handle.pending(), 2);

        let mut volumes = Vec::new();
        queue.drain(|cmd| {
            if let EngineCommand::SetMainVolume(v) = cmd {
                volumes.push(v);
            }
        });
        assert_eq!(volumes, vec![0.1, 0.2]);
    }

    #[test]
    fn invalid_commands_are_not_queued() {
        let (handle, _queue) = message_bus(4);
        assert!(handle.note_on(0, 60, 440.0, 0.5).is_err());
        assert!(handle.set_main_frequency(-1.0).is_err());
        let err = handle
            .replace_waveform(vec![ControlPoint::new(0.5, 0.0)])
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidWaveform(_)));
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn send_after_engine_dropped_reports_disconnect() {
        let (handle, queue) = message_bus(4);
        drop(queue);
        assert_eq!(handle.reset_monophonic(), Err(CommandError::Disconnected));
    }

    #[test]
    fn retired_tables_return_to_handle() {
        let (handle, queue) = message_bus(4);
        queue.retire(WaveformTable::silent());
        queue.retire(WaveformTable::silent());
        assert_eq!(handle.collect_retired(), 2);
        assert_eq!(handle.collect_retired(), 0);
    }

    #[test]
    fn retired_channel_holds_a_full_drain() {
        let (handle, queue) = message_bus(32);
        for _ in 0..32 {
            handle.set_waveform(WaveformTable::silent()).unwrap();
        }
        let swapped = queue.drain(|cmd| {
            if let EngineCommand::ReplaceWaveform(table) = cmd {
                queue.retire(table);
            }
        });
        assert_eq!(swapped, 32);
        assert_eq!(handle.collect_retired(), 32);
    }
}

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use hear_waveform::core::audio::{bounce_to_wav, AudioOutput};
use hear_waveform::core::midi::MidiInputHandler;
use hear_waveform::core::waveform::shapes::Shape;
use hear_waveform::utils::format_frequency;
use hear_waveform::{ControlPoint, Engine, EngineHandle, Settings, WaveformTable};

const HELP: &str = "\
commands:
  freq <hz>            set the main tone frequency
  vol <percent>        set the main tone volume (0-100)
  shape <name>         silence | square | saw | sine
  point <phase> <val>  add a control point to the current shape
  reset                stop all notes, back to the main tone
  midi [name]          connect a MIDI input (first port if no name)
  ports                list MIDI input ports
  quit";

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting HearWaveform");

    let settings = Settings::load_or_default();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("--bounce") => {
            let path = args
                .get(1)
                .map(PathBuf::from)
                .context("usage: --bounce <file.wav> [seconds]")?;
            let seconds = match args.get(2) {
                Some(s) => s.parse::<f32>().with_context(|| format!("invalid duration '{s}'"))?,
                None => 2.0,
            };
            bounce(&settings, &path, seconds)
        }
        Some("--save-settings") => {
            let path = settings.save()?;
            println!("settings written to {}", path.display());
            Ok(())
        }
        Some(other) => bail!("unknown argument '{other}'"),
        None => run_live(settings),
    }
}

fn bounce(settings: &Settings, path: &Path, seconds: f32) -> Result<()> {
    let sample_rate = settings.sample_rate.unwrap_or(44100) as f32;
    let (mut engine, handle) = Engine::new(settings.engine_config(sample_rate));
    handle.set_waveform(settings.shape.table())?;
    let block = settings.block_size.unwrap_or(512) as usize;
    bounce_to_wav(&mut engine, seconds, block, path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn run_live(settings: Settings) -> Result<()> {
    let (output, handle) = AudioOutput::start(&settings)?;
    info!("Output running at {} Hz on {} channel(s)", output.sample_rate(), output.channels());

    let mut table = settings.shape.table();
    handle.set_waveform(table.clone())?;

    let mut midi = MidiInputHandler::new(handle.clone());
    if let Err(err) = midi.connect(settings.midi_port.as_deref()) {
        warn!("MIDI input unavailable: {err}");
    }

    println!("{HELP}");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => println!("{HELP}"),
            cmd => {
                if let Err(err) = run_command(cmd, &handle, &mut table, &mut midi) {
                    println!("error: {err:#}");
                }
            }
        }
        print!("> ");
        io::stdout().flush().ok();
    }

    info!("Shutting down");
    Ok(())
}

fn run_command(
    words: &[&str],
    handle: &EngineHandle,
    table: &mut WaveformTable,
    midi: &mut MidiInputHandler,
) -> Result<()> {
    match words {
        ["freq", hz] => {
            let hz: f32 = hz.parse().context("frequency must be a number")?;
            handle.set_main_frequency(hz)?;
            println!("main tone at {}", format_frequency(hz));
        }
        ["vol", percent] => {
            let percent: f32 = percent.parse().context("volume must be a number")?;
            handle.set_main_volume(percent / 100.0)?;
        }
        ["shape", name] => {
            let shape = Shape::from_name(name).with_context(|| format!("unknown shape '{name}'"))?;
            *table = shape.table();
            handle.set_waveform(table.clone())?;
        }
        ["point", phase, value] => {
            let point = ControlPoint::new(
                phase.parse::<f32>().context("phase must be a number")?,
                value.parse::<f32>().context("value must be a number")?,
            );
            let edited = table.with_point(point)?;
            handle.set_waveform(edited.clone())?;
            *table = edited;
        }
        ["reset"] => handle.reset_monophonic()?,
        ["midi"] => {
            let name = midi.connect(None)?;
            println!("connected to {name}");
        }
        ["midi", name @ ..] => {
            let name = midi.connect(Some(&name.join(" ")))?;
            println!("connected to {name}");
        }
        ["ports"] => {
            for port in MidiInputHandler::list_ports()? {
                println!("  {port}");
            }
        }
        _ => println!("unknown command, type 'help'"),
    }
    Ok(())
}

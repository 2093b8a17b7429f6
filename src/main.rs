use std::{error::Error, sync::mpsc, thread};

use clap::{Parser, Subcommand};
use eframe::{egui::ViewportBuilder, run_native};
use rodio::{OutputStream, Sink};

use pesky_clock::{
    communication::Message,
    config::Config,
    sound::{tone_sequence, SoundKind, ToneSource},
    PeskyClock,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a fresh default config
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// play one of the alarm sounds once and exit
    TestSound {
        sound: SoundKind,
        #[clap(long, default_value_t = 5)]
        seconds: u32,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("pesky_clock").expect("couldn't initialize logger");

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => {
            if force || !Config::is_config_present() {
                match Config::config_path() {
                    Some(path) => Config::new().save(&path),
                    None => eprintln!("no config directory on this system"),
                }
            }
            return Ok(());
        }
        Some(Command::TestSound { sound, seconds }) => return play_once(sound, seconds),
        None => {}
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || playback_loop(&rx));

    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Pesky Clock")
            .with_inner_size([400.0, 560.0]),
        ..Default::default()
    };
    // run the gui
    run_native(
        "Pesky Clock",
        native_options,
        Box::new(|_| Ok(Box::new(PeskyClock::new(tx)))),
    )
    .map_err(Into::into)
}

/// the audio thread: owns the output stream and whatever sink is currently
/// screaming. without an audio device it just drains messages so the gui
/// side never notices.
fn playback_loop(rx: &mpsc::Receiver<Message>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(error) => {
            log::error!("audio output unavailable, alarms will be silent: {error}");
            while rx.recv().is_ok() {}
            return;
        }
    };
    let mut playing: Option<Sink> = None;
    while let Ok(message) = rx.recv() {
        match message {
            Message::Play {
                kind,
                volume,
                duration_seconds,
            } => {
                // one sound at a time, a new alarm cuts the old one off
                if let Some(previous) = playing.take() {
                    previous.stop();
                }
                let sink = match Sink::try_new(&handle) {
                    Ok(sink) => sink,
                    Err(error) => {
                        log::error!("couldn't open a playback sink: {error}");
                        continue;
                    }
                };
                sink.set_volume(f32::from(volume) / 100.0);
                for tone in tone_sequence(kind, duration_seconds) {
                    sink.append(ToneSource::new(tone));
                }
                playing = Some(sink);
            }
            // stop is fine with nothing playing
            Message::Stop => {
                if let Some(sink) = playing.take() {
                    sink.stop();
                }
            }
        }
    }
}

fn play_once(sound: SoundKind, seconds: u32) -> Result<(), Box<dyn Error>> {
    let (_stream, handle) = OutputStream::try_default()?;
    let sink = Sink::try_new(&handle)?;
    for tone in tone_sequence(sound, seconds) {
        sink.append(ToneSource::new(tone));
    }
    sink.sleep_until_end();
    Ok(())
}

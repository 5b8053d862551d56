use std::path::PathBuf;
use std::time::Instant;

use utau_rs::{Engine, EngineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let voicebank_path = PathBuf::from(args.next().unwrap_or_else(|| "voicebanks/teto".into()));
    let out_path = PathBuf::from(args.next().unwrap_or_else(|| "render.wav".into()));

    let config_path = PathBuf::from("utau.json");
    let config = if config_path.exists() {
        EngineConfig::from_json_file(&config_path)?
    } else {
        EngineConfig::default()
    };

    let mut engine = Engine::with_config(config);

    let load_start = Instant::now();
    engine.load_voicebank(&voicebank_path)?;
    println!("Voicebank loaded in {:.2?}", load_start.elapsed());

    let aliases = engine.list_aliases();
    println!("{} aliases, e.g. {:?}", aliases.len(), &aliases[..aliases.len().min(8)]);

    let lyrics = ["a", "ka", "sa", "ta", "na", "ha", "ma", "ya"];
    let timeline = engine.timeline_mut();
    timeline.set_bpm(120.0)?;
    timeline.set_beats(8);
    for (i, lyric) in lyrics.iter().enumerate() {
        timeline.add_note(i as f64, 1.0, 60 + i as u8, lyric)?;
    }

    let plan = engine.schedule();
    println!("{} of {} notes resolved", plan.len(), lyrics.len());

    let render_start = Instant::now();
    engine.render_to_file(&out_path)?;
    println!(
        "Rendered in {:.2?}, saved to {}",
        render_start.elapsed(),
        out_path.display()
    );

    #[cfg(feature = "device")]
    {
        use utau_rs::render::{device::DeviceOutput, LiveRenderer};

        let renderer = LiveRenderer::new(DeviceOutput::open()?);
        let started = engine.play(&renderer);
        println!("Playing {started} notes");
        let secs = engine.state().timeline.schedule_end_secs() + 1.0;
        std::thread::sleep(std::time::Duration::from_secs_f64(secs));
        renderer.stop();
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, bail};
use tlmouse::host::{HostInterop, ObjectStore};
use tlmouse::script::{Replay, Script};
use tlmouse::{InteractionDispatcher, Settings};

fn usage() -> ! {
    eprintln!("usage: tlmouse <script.json> [--settings <settings.json>]");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut script_path = None;
    let mut settings_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => match args.next() {
                Some(p) => settings_path = Some(PathBuf::from(p)),
                None => usage(),
            },
            "-h" | "--help" => usage(),
            _ if script_path.is_none() => script_path = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {}", arg),
        }
    }
    let Some(script_path) = script_path else {
        usage();
    };

    let settings = match settings_path {
        Some(path) => Settings::load_from(&path)?,
        None => Settings::load()?,
    };
    let script = Script::load(&script_path)
        .with_context(|| format!("loading script {}", script_path.display()))?;
    let host = script.build_host()?;
    log::info!(
        "Replaying {} events over {} objects",
        script.events.len(),
        script.objects.len()
    );

    let mut replay = Replay::new(InteractionDispatcher::new(settings), host);
    for (i, &event) in script.events.iter().enumerate() {
        let dispatch = replay.step(event);
        log::debug!("#{} {:?} -> {:?}", i, event, dispatch);
    }

    let host = &replay.host;
    let view = host.view();
    println!("frame: {}", host.current_frame());
    println!("scene: {}", host.current_scene());
    println!(
        "view: scroll {} layer {} zoom {} height {}",
        view.frame_scroll, view.layer_scroll, view.zoom_level, view.layer_height
    );
    println!("selection: {:?}", host.selection().iter().map(|id| id.0).collect::<Vec<_>>());
    for layer in 0..tlmouse::constants::NUM_LAYERS {
        for &id in host.layer_objects(layer) {
            if let Some(o) = host.object(id) {
                println!(
                    "object {}: layer {} [{}, {}]{}",
                    id.0,
                    o.layer,
                    o.begin,
                    o.end,
                    if o.active { "" } else { " inactive" }
                );
            }
        }
    }
    Ok(())
}

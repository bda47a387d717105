//! Headless virtual-time run.

use std::time::Duration;

use anyhow::Result;
use lattice_core::engine::VISIBLE_CLASS;
use lattice_core::live::{LivePhase, REQUIRED_SLOTS};
use lattice_core::page::BlockKind;
use lattice_core::{Config, HeadlessRuntime, PageEngine, PageManifest};
use tracing::info;

pub struct SimulateOptions {
    pub duration_ms: u64,
    pub scroll_step: f64,
    pub step_ms: u64,
    pub viewport_height: f64,
    pub trace: bool,
}

pub fn run(config: &Config, manifest: &PageManifest, options: &SimulateOptions) -> Result<()> {
    let layout = manifest.layout();
    info!(
        title = %layout.title,
        height = layout.height,
        duration_ms = options.duration_ms,
        "simulating page"
    );
    let engine = PageEngine::new(layout, config.engine_options());
    let mut runtime =
        HeadlessRuntime::new(engine, config.frame_interval(), options.viewport_height);

    if options.trace {
        runtime.set_effect_sink(Box::new(|now, effect| {
            println!("{:>7}ms  {effect}", now.as_millis());
        }));
    }

    runtime.start();
    runtime.scroll_through(
        options.scroll_step,
        Duration::from_millis(options.step_ms.max(1)),
        Duration::from_millis(options.duration_ms),
    );

    print_summary(&runtime);
    Ok(())
}

fn print_summary(runtime: &HeadlessRuntime) {
    let engine = runtime.engine();
    let display = runtime.display();
    let layout = engine.layout();

    println!(
        "Simulated {} ms, viewport at {} of {} px",
        runtime.now().as_millis(),
        runtime.viewport().y,
        layout.max_scroll(runtime.viewport().height)
    );

    for element in &layout.elements {
        let id = element.id;
        match &element.block.kind {
            BlockKind::Text { .. } => {}
            BlockKind::Reveal { .. } => {
                let state = if display.has_class(id, VISIBLE_CLASS) {
                    "visible"
                } else {
                    "hidden"
                };
                println!("{id} reveal: {state}");
            }
            BlockKind::Counter { label, suffix, .. } => match display.element_text(id) {
                Some(text) => println!(
                    "{id} counter {label:?}: {text}{}",
                    suffix.as_deref().unwrap_or("")
                ),
                None => println!("{id} counter {label:?}: (not triggered)"),
            },
            BlockKind::BarGroup { bars, .. } => {
                let widths: Vec<String> = (0..bars.len())
                    .filter_map(|index| display.bar(id, index))
                    .map(|bar| format!("{}%", bar.width_percent))
                    .collect();
                if widths.is_empty() {
                    println!("{id} bars: (not triggered)");
                } else {
                    println!("{id} bars: {}", widths.join(", "));
                }
            }
            BlockKind::Live { .. } => {}
        }
    }

    let live = engine.live();
    let phase = match live.phase() {
        LivePhase::Idle => "inert",
        LivePhase::Armed => "waiting",
        LivePhase::Running => "running",
    };
    println!("live: {phase}, {} ticks", live.state().ticks);
    if live.phase() == LivePhase::Running {
        for slot in REQUIRED_SLOTS {
            println!("  {slot}: {}", display.slot(slot).unwrap_or("0"));
        }
    }
}

use crate::config;
use crate::effects::AmbienceKind;
use crate::error::EngineError;
use crate::fetch::{AssetLoader, FsAssetSource};
use crate::model::Settings;
use crate::player::Player;
use crate::studio::{MemoryStudio, RodioStudio, StudioEngine};
use crate::ui::{self, CONTROLS, Control};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(20);
const REDRAW: Duration = Duration::from_millis(250);
const STEP: i16 = 5;
const FINE_STEP: i16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Save,
    Quit,
}

fn open_engine(settings: &Settings) -> Box<dyn StudioEngine> {
    if settings.null_audio {
        log::info!("audio output disabled");
        return Box::new(MemoryStudio::new());
    }
    match RodioStudio::new() {
        Ok(engine) => Box::new(engine),
        Err(err) => {
            log::warn!("no audio output, running silent: {err}");
            Box::new(MemoryStudio::new())
        }
    }
}

pub fn run(mut settings: Settings) -> Result<()> {
    let mut engine = open_engine(&settings);
    let source = Arc::new(FsAssetSource::new(settings.asset_root.clone()));
    let loader = AssetLoader::new(source, Duration::from_millis(settings.fetch_timeout_ms));
    let mut player = Player::new(&settings, loader);
    player.start(&mut *engine)?;

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut selected = 0;
    let mut last_draw = Instant::now();

    let result: Result<()> = loop {
        if let Err(err) = player.tick(&mut *engine) {
            log::error!("engine failure: {err}");
            break Err(err.into());
        }

        if player.dirty || last_draw.elapsed() > REDRAW {
            terminal.draw(|frame| ui::draw(frame, &player, &*engine, selected))?;
            player.dirty = false;
            last_draw = Instant::now();
        }

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(&mut player, &mut *engine, &mut selected, key) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Save) => {
                settings.controls = *player.controls();
                player.status = match config::save_settings(&settings) {
                    Ok(()) => String::from("Settings saved"),
                    Err(err) => format!("save error: {err:#}"),
                };
                player.dirty = true;
            }
            Ok(Flow::Quit) => break Ok(()),
            Err(err) => {
                log::error!("engine failure: {err}");
                break Err(err.into());
            }
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    settings.controls = *player.controls();
    let save_result = config::save_settings(&settings);
    result?;
    save_result?;
    Ok(())
}

fn handle_key(
    player: &mut Player,
    engine: &mut dyn StudioEngine,
    selected: &mut usize,
    key: KeyEvent,
) -> Result<Flow, EngineError> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Ok(Flow::Quit);
        }
        KeyCode::Char('q') => return Ok(Flow::Quit),
        KeyCode::Char('s') => return Ok(Flow::Save),
        KeyCode::Char(' ') => player.toggle_pause(engine)?,
        KeyCode::Char('n') | KeyCode::Right => player.next_track(engine, true)?,
        KeyCode::Char('p') | KeyCode::Left => player.last_track(engine, true)?,
        KeyCode::Char(digit @ '1'..='4') => {
            let index = usize::from(digit as u8 - b'1');
            player.toggle_ambience(engine, AmbienceKind::ALL[index])?;
        }
        KeyCode::Down => {
            *selected = (*selected + 1) % CONTROLS.len();
            player.dirty = true;
        }
        KeyCode::Up => {
            *selected = (*selected + CONTROLS.len() - 1) % CONTROLS.len();
            player.dirty = true;
        }
        KeyCode::Char('+') | KeyCode::Char('=') => adjust(player, engine, *selected, STEP)?,
        KeyCode::Char('-') => adjust(player, engine, *selected, -STEP)?,
        KeyCode::Char(']') => adjust(player, engine, *selected, FINE_STEP)?,
        KeyCode::Char('[') => adjust(player, engine, *selected, -FINE_STEP)?,
        KeyCode::Char('r') => player.retry_failed(),
        _ => {}
    }
    Ok(Flow::Continue)
}

fn adjust(
    player: &mut Player,
    engine: &mut dyn StudioEngine,
    selected: usize,
    delta: i16,
) -> Result<(), EngineError> {
    let step = |raw: u8| (i16::from(raw) + delta).clamp(0, 100) as u8;
    match CONTROLS[selected % CONTROLS.len()] {
        Control::Effect(kind) => {
            let raw = step(player.controls().effect(kind));
            player.set_effect(kind, raw);
            player.status = format!("{} {raw}", kind.label());
        }
        Control::Ambience(kind) => {
            let raw = step(player.controls().ambience(kind));
            player.set_ambience_amount(engine, kind, raw)?;
            player.status = format!("{} amount {raw}", kind.label());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use crate::fetch::MemoryAssetSource;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn started() -> (Player, MemoryStudio) {
        let source = MemoryAssetSource::new().with_asset("ambience/vinyl.ogg", vec![1_u8; 4]);
        let loader = AssetLoader::new(Arc::new(source), Duration::from_secs(1));
        let mut player = Player::new(&Settings::default(), loader);
        let mut studio = MemoryStudio::new();
        player.start(&mut studio).expect("start");
        (player, studio)
    }

    #[test]
    fn quit_and_save_keys_end_in_flow_changes() {
        let (mut player, mut studio) = started();
        let mut selected = 0;
        let flow = handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('q')));
        assert_eq!(flow, Ok(Flow::Quit));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            handle_key(&mut player, &mut studio, &mut selected, ctrl_c),
            Ok(Flow::Quit)
        );
        assert_eq!(
            handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('s'))),
            Ok(Flow::Save)
        );
    }

    #[test]
    fn selection_wraps_in_both_directions() {
        let (mut player, mut studio) = started();
        let mut selected = 0;
        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Up)).expect("up");
        assert_eq!(selected, CONTROLS.len() - 1);
        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Down)).expect("down");
        assert_eq!(selected, 0);
    }

    #[test]
    fn plus_and_minus_step_the_selected_effect() {
        let (mut player, mut studio) = started();
        let mut selected = 0;
        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('+'))).expect("+");
        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char(']'))).expect("]");
        assert_eq!(player.controls().effect(EffectKind::Grit), 6);

        for _ in 0..5 {
            handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('-')))
                .expect("-");
        }
        assert_eq!(player.controls().effect(EffectKind::Grit), 0);
    }

    #[test]
    fn ambience_amount_is_capped_at_one_hundred() {
        let (mut player, mut studio) = started();
        let mut selected = CONTROLS.len() - 1;
        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('+'))).expect("+");
        assert_eq!(player.controls().ambience(AmbienceKind::Radio), 100);
    }

    #[test]
    fn digit_keys_toggle_ambience_layers() {
        let (mut player, mut studio) = started();
        let mut selected = 0;
        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('2'))).expect("2");
        assert!(player.ambience_active(&studio, AmbienceKind::Vinyl));

        handle_key(&mut player, &mut studio, &mut selected, key(KeyCode::Char('1'))).expect("1");
        assert!(player.status.contains("unavailable"));
    }
}

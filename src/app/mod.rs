pub mod canvas;
pub mod observer;
pub mod renderer;

use std::{
    fmt,
    io::{Stdout, Write},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, KeyCode},
    queue,
    terminal::{self, ClearType},
};

use crate::{
    engine::MazeEngine,
    error::{MazeError, Result},
    maze::Coord,
};
pub use observer::{MazeObserver, RunInfo, notify_generation, notify_solve};
pub use renderer::TerminalRenderer;

/// How generation is pictured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Start from solid rock and carve passages out of it.
    #[default]
    RemoveWalls,
    /// Start from an open field and raise walls around each entered cell.
    BuildWalls,
    /// Keep every wall and paint cell interiors as they join the maze.
    FillCells,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [
        RenderMode::RemoveWalls,
        RenderMode::BuildWalls,
        RenderMode::FillCells,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::RemoveWalls => "remove-walls",
            RenderMode::BuildWalls => "build-walls",
            RenderMode::FillCells => "fill-cells",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RenderMode {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        RenderMode::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| MazeError::UnknownRenderMode(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub mode: RenderMode,
    /// Pause after every generation event while it is shown.
    pub generation_delay: Duration,
    /// Pause after every solve event while it is shown.
    pub solve_delay: Duration,
    pub show_generation: bool,
    pub show_backtracks: bool,
    pub show_solve: bool,
    /// Whether to solve at all once generation completes.
    pub solve: bool,
    pub inverse_colors: bool,
    /// How often the input thread checks whether the run is over.
    pub input_poll_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::RemoveWalls,
            generation_delay: Duration::from_millis(10),
            solve_delay: Duration::from_millis(20),
            show_generation: true,
            show_backtracks: false,
            show_solve: true,
            solve: true,
            inverse_colors: false,
            input_poll_timeout: Duration::from_millis(100),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cancelled,
    Generated { elapsed: Duration },
    Solved { elapsed: Duration, path: Vec<Coord> },
}

/// Drives an engine and paces its events for an observer.
pub struct App {
    options: AppOptions,
}

impl Default for App {
    fn default() -> Self {
        App::new(AppOptions::default())
    }
}

impl App {
    /// Slice the pacing sleep is cut into, so pause and cancel feel immediate.
    const WAIT_SLICE: Duration = Duration::from_millis(10);

    pub fn new(options: AppOptions) -> Self {
        App { options }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Runs one generation (and solve) on the terminal.
    ///
    /// Keys are read on a separate thread: Esc or `q` cancels, Space pauses.
    /// After a finished run the last frame stays up until Esc is pressed.
    pub fn run(&self, engine: &mut MazeEngine) -> Result<Outcome> {
        let (columns, rows) = terminal::size()?;
        let mut renderer = TerminalRenderer::new(std::io::stdout(), self.options.clone())
            .with_viewport(columns, rows);

        let cancel = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        engine.set_cancel_flag(Some(cancel.clone()));
        let input_thread_handle = self.spawn_input_thread(&cancel, &paused, &done);

        let outcome = self.animate(engine, &mut renderer, &paused, &cancel);

        done.store(true, Ordering::Relaxed);
        let input_result = match input_thread_handle.join() {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("[input loop] input thread panicked");
                Ok(())
            }
        };
        engine.set_cancel_flag(None);
        input_result?;

        let outcome = outcome?;
        if outcome != Outcome::Cancelled {
            App::wait_for_esc()?;
        }
        Ok(outcome)
    }

    /// Reads keys until `done` or `cancel` is set. Must only be spawned once
    /// nothing fallible stands between it and the store to `done`.
    fn spawn_input_thread(
        &self,
        cancel: &Arc<AtomicBool>,
        paused: &Arc<AtomicBool>,
        done: &Arc<AtomicBool>,
    ) -> JoinHandle<std::io::Result<()>> {
        let (cancel, paused, done) = (cancel.clone(), paused.clone(), done.clone());
        let poll_timeout = self.options.input_poll_timeout;
        std::thread::spawn(move || {
            App::listen_to_user_input(poll_timeout, &cancel, &paused, &done)
        })
    }

    /// Feeds every event of one run to `observer`, sleeping between them as
    /// configured. Returns early once `cancel` is set.
    pub fn animate<O: MazeObserver + ?Sized>(
        &self,
        engine: &mut MazeEngine,
        observer: &mut O,
        paused: &AtomicBool,
        cancel: &AtomicBool,
    ) -> Result<Outcome> {
        let (height, width) = (engine.maze().height(), engine.maze().width());
        observer.on_run_started(&RunInfo {
            height,
            width,
            generator: engine.generator(),
            seed: engine.seed(),
        })?;

        let mut generation = engine.generate();
        while let Some(event) = generation.next() {
            notify_generation(observer, event)?;
            if self.options.show_generation {
                App::wait(self.options.generation_delay, paused, cancel);
            }
        }
        let complete = generation.is_complete();
        let generation_elapsed = generation.elapsed();
        drop(generation);
        if !complete {
            tracing::info!("[app] generation cancelled");
            return Ok(Outcome::Cancelled);
        }
        if !self.options.solve {
            return Ok(Outcome::Generated {
                elapsed: generation_elapsed,
            });
        }

        let mut solve = engine.solve()?;
        observer.on_solve_started(solve.maze().start(), solve.maze().stop())?;
        let mut solved = false;
        while let Some(event) = solve.next() {
            notify_solve(observer, event)?;
            if self.options.show_solve {
                App::wait(self.options.solve_delay, paused, cancel);
            }
            solved = event == crate::solvers::SolveEvent::SolveComplete;
        }
        if !solved {
            tracing::info!("[app] solve cancelled");
            return Ok(Outcome::Cancelled);
        }
        Ok(Outcome::Solved {
            elapsed: generation_elapsed + solve.elapsed(),
            path: solve.path().to_vec(),
        })
    }

    /// Sleeps for `delay`, then keeps sleeping while paused. Cancelling
    /// ends the wait at once.
    fn wait(delay: Duration, paused: &AtomicBool, cancel: &AtomicBool) {
        let started = Instant::now();
        loop {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let remaining = delay.saturating_sub(started.elapsed());
            if remaining.is_zero() && !paused.load(Ordering::Relaxed) {
                return;
            }
            let slice = if remaining.is_zero() {
                App::WAIT_SLICE
            } else {
                remaining.min(App::WAIT_SLICE)
            };
            std::thread::sleep(slice);
        }
    }

    /// Listen for key presses until the run is done or cancelled.
    /// This function runs in a separate thread, and is the only place where user input is read
    fn listen_to_user_input(
        event_poll_timeout: Duration,
        cancel: &AtomicBool,
        paused: &AtomicBool,
        done: &AtomicBool,
    ) -> std::io::Result<()> {
        loop {
            if done.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
                return Ok(());
            }

            if !event::poll(event_poll_timeout)? {
                continue;
            }

            // Only key presses matter
            let event::Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind != event::KeyEventKind::Press {
                continue;
            }
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    tracing::debug!("[input loop] cancel requested, exiting");
                    cancel.store(true, Ordering::Relaxed);
                    return Ok(());
                }
                KeyCode::Char(' ') => {
                    let was_paused = paused.fetch_xor(true, Ordering::Relaxed);
                    tracing::debug!("[input loop] paused: {}", !was_paused);
                }
                _ => {}
            }
        }
    }

    /// Wait for the user to press the Esc key
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        generators::{DirectionPolicy, Generator},
        maze::Direction,
    };

    #[derive(Default)]
    struct Recorder {
        started: Option<RunInfo>,
        entered: Vec<Coord>,
        opened: usize,
        on_path: usize,
        completed: bool,
    }

    impl MazeObserver for Recorder {
        fn on_run_started(&mut self, info: &RunInfo) -> Result<()> {
            self.started = Some(*info);
            Ok(())
        }

        fn on_cell_entered(&mut self, cell: Coord) -> Result<()> {
            self.entered.push(cell);
            Ok(())
        }

        fn on_passage_opened(&mut self, _cell: Coord, _dir: Direction) -> Result<()> {
            self.opened += 1;
            Ok(())
        }

        fn on_cell_marked_on_path(&mut self, _cell: Coord) -> Result<()> {
            self.on_path += 1;
            Ok(())
        }

        fn on_solve_complete(&mut self) -> Result<()> {
            self.completed = true;
            Ok(())
        }
    }

    fn quick_options() -> AppOptions {
        AppOptions {
            generation_delay: Duration::ZERO,
            solve_delay: Duration::ZERO,
            ..AppOptions::default()
        }
    }

    #[test]
    fn test_render_mode_from_str() {
        assert_eq!(
            " Fill-Cells ".parse::<RenderMode>().unwrap(),
            RenderMode::FillCells
        );
        for mode in RenderMode::ALL {
            assert_eq!(mode.to_string().parse::<RenderMode>().unwrap(), mode);
        }
        assert!(matches!(
            "spiral".parse::<RenderMode>(),
            Err(MazeError::UnknownRenderMode(_))
        ));
    }

    #[test]
    fn test_animate_full_run() {
        let generator = Generator::RecurBacktrack(DirectionPolicy::Straight);
        let mut engine = MazeEngine::new(6, 7, generator, 21).unwrap();
        let app = App::new(quick_options());
        let mut recorder = Recorder::default();
        let (paused, cancel) = (AtomicBool::new(false), AtomicBool::new(false));

        let outcome = app
            .animate(&mut engine, &mut recorder, &paused, &cancel)
            .unwrap();

        let Outcome::Solved { path, .. } = outcome else {
            panic!("run did not finish: {:?}", outcome);
        };
        let (start, stop) = (engine.maze().start(), engine.maze().stop());
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&stop));
        let walked: HashSet<Coord> = path.iter().copied().collect();
        let marked: HashSet<Coord> = engine.maze().cells_on_path().into_iter().collect();
        assert_eq!(walked.len(), path.len());
        assert_eq!(walked, marked);
        assert_eq!(recorder.started.map(|info| info.seed), Some(21));
        assert_eq!(recorder.entered.len(), 42);
        assert_eq!(recorder.opened, 41);
        assert!(recorder.on_path >= path.len());
        assert!(recorder.completed);
        assert!(engine.is_solved());
    }

    #[test]
    fn test_animate_without_solve() {
        let mut engine = MazeEngine::new(3, 3, Generator::Kruskal, 1).unwrap();
        let app = App::new(AppOptions {
            solve: false,
            ..quick_options()
        });
        let mut recorder = Recorder::default();
        let (paused, cancel) = (AtomicBool::new(false), AtomicBool::new(false));
        let outcome = app
            .animate(&mut engine, &mut recorder, &paused, &cancel)
            .unwrap();
        assert!(matches!(outcome, Outcome::Generated { .. }));
        assert_eq!(recorder.on_path, 0);
        assert!(engine.is_generated());
        assert!(!engine.is_solved());
    }

    #[test]
    fn test_animate_cancelled() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut engine = MazeEngine::new(5, 5, Generator::Prim, 2).unwrap();
        engine.set_cancel_flag(Some(cancel.clone()));
        let app = App::new(quick_options());
        let mut recorder = Recorder::default();
        let outcome = app
            .animate(&mut engine, &mut recorder, &AtomicBool::new(false), &cancel)
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(recorder.entered.is_empty());
        assert!(!engine.is_generated());
    }

    #[test]
    fn test_input_thread_stops_once_done() {
        let app = App::new(quick_options());
        let cancel = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(true));
        let handle = app.spawn_input_thread(&cancel, &paused, &done);
        assert!(handle.join().unwrap().is_ok());
        assert!(!cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn test_wait_ends_when_cancelled_while_paused() {
        let started = Instant::now();
        App::wait(
            Duration::from_secs(5),
            &AtomicBool::new(true),
            &AtomicBool::new(true),
        );
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}

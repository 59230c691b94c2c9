use clap::Parser;
use prattle::{graph, Directive, Error, Player, PlayerConfig, Portraits, Script, Transition};
use std::{
    collections::HashMap,
    error, fs,
    io::{self, BufRead as _, Write as _},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

/// Play prattle dialogue scripts in the terminal.
///
/// Press enter to advance or finish the current line, type an option number to choose it,
/// `q` to leave.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Directory whose files are all loaded as scripts
    #[arg(long)]
    scripts: PathBuf,
    /// Directory of portrait images, named by file stem
    #[arg(long)]
    portraits: Option<PathBuf>,
    /// Key to start the conversation at
    #[arg(long)]
    start: Option<String>,
    /// Title shown over options
    #[arg(long, default_value = "")]
    name: String,
    /// Reveal text unit by unit
    #[arg(long)]
    typewriter: bool,
    /// Milliseconds between typewriter ticks
    #[arg(long, default_value_t = 30)]
    tick_ms: u64,
    #[arg(long, default_value_t = 4)]
    option_slots: usize,
    #[arg(long, default_value_t = 2)]
    portrait_slots: usize,
    /// Variable key resolution, e.g. `--var '#mood=good'`
    #[arg(long = "var", value_parser = parse_var)]
    vars: Vec<(String, String)>,
    /// Report dangling and unreachable keys instead of playing
    #[arg(long)]
    check: bool,
}

impl Args {
    fn config(&self) -> PlayerConfig {
        PlayerConfig::default()
            .with_main_character_name(self.name.as_str())
            .with_typewriter(self.typewriter)
            .with_option_slots(self.option_slots)
            .with_portrait_slots(self.portrait_slots)
    }
}

type BoxResult<T> = Result<T, Box<dyn error::Error>>;

fn parse_var(arg: &str) -> Result<(String, String), String> {
    let (key, target) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected `#key=target`, got `{arg}`"))?;
    if !prattle::is_variable(key) {
        return Err(format!("variable keys start with `#`, got `{key}`"));
    }
    Ok((key.to_owned(), target.to_owned()))
}

fn sorted_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_script(dir: &Path) -> BoxResult<Script> {
    let blobs = sorted_files(dir)?
        .into_iter()
        .map(|path| {
            log::debug!("reading script {}", path.display());
            fs::read_to_string(&path)
        })
        .collect::<io::Result<Vec<_>>>()?;
    let mut script = Script::new();
    script.load(blobs.iter().map(String::as_str))?;
    Ok(script)
}

fn load_portraits(dir: Option<&Path>) -> io::Result<Portraits<PathBuf>> {
    let Some(dir) = dir else {
        return Ok(Portraits::new());
    };
    Ok(sorted_files(dir)?
        .into_iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_owned();
            Some((name, path))
        })
        .collect())
}

fn check(script: &Script, start: Option<&str>) {
    let dangling = graph::dangling(script);
    for dangling in &dangling {
        println!(
            "`{}` branches to undefined `{}`",
            dangling.from, dangling.branch.target
        );
    }
    if let Some(start) = start {
        let (guide, story) = graph::read(script);
        let reachable = graph::reachable(&guide, &story, start);
        let mut unreachable: Vec<_> = script
            .keys()
            .filter(|key| !reachable.contains(key))
            .collect();
        unreachable.sort_unstable();
        for key in unreachable {
            println!("`{key}` is unreachable from `{start}`");
        }
    }
    println!("{} keys, {} dangling options", script.len(), dangling.len());
}

#[derive(Default)]
struct Screen {
    title: String,
    body: String,
}

impl Screen {
    fn render(&mut self, directives: Vec<Directive<PathBuf>>) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for directive in directives {
            match directive {
                Directive::Open => writeln!(stdout, "~~~")?,
                Directive::Close => writeln!(stdout, "\n~~~")?,
                Directive::SetTitle(title) => self.title = title,
                Directive::SetBodyText(text) => {
                    if !text.is_empty() && text.starts_with(&self.body) && !self.body.is_empty() {
                        write!(stdout, "{}", &text[self.body.len()..])?;
                    } else {
                        self.start_line(&mut stdout)?;
                        write!(stdout, "{text}")?;
                    }
                    self.body = text;
                }
                Directive::AppendBodyText(unit) => {
                    write!(stdout, "{unit}")?;
                    self.body.push_str(&unit);
                }
                Directive::SetPortraitSlot(cue) => {
                    let name = cue.name.as_deref().unwrap_or("-");
                    let action = match cue.transition {
                        Transition::Stay => continue,
                        Transition::Enter => "enters",
                        Transition::Exit => "leaves",
                        Transition::SwitchCharacter => "switches to",
                        Transition::ChangeExpression => "now looks",
                    };
                    writeln!(stdout, "\n  [slot {}] {action} {name}", cue.slot)?;
                }
                Directive::SetOption { slot, label } => {
                    if slot == 0 {
                        self.start_line(&mut stdout)?;
                        writeln!(stdout)?;
                    }
                    writeln!(stdout, "  {}) {label}", slot + 1)?;
                }
                Directive::SetContentVisible(visible) => {
                    log::trace!("content visible: {visible}");
                }
                Directive::SetOptionsVisible(visible) => {
                    log::trace!("options visible: {visible}");
                }
                Directive::HideOptionSlot(slot) => log::trace!("option slot {slot} hidden"),
            }
        }
        stdout.flush()
    }

    fn start_line(&self, out: &mut impl io::Write) -> io::Result<()> {
        if self.title.is_empty() {
            write!(out, "\n> ")
        } else {
            write!(out, "\n{}: ", self.title)
        }
    }
}

fn spawn_input() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn play(args: &Args, script: &Script, portraits: &Portraits<PathBuf>, start: &str) -> BoxResult<()> {
    let vars: HashMap<_, _> = args.vars.iter().cloned().collect();
    let mut player = Player::new(script, portraits, args.config()).with_resolver(move |key| {
        vars.get(key).cloned().unwrap_or_else(|| {
            log::warn!("no `--var` for `{key}`, leaving the conversation");
            String::new()
        })
    });
    player.on_key_reached(|key| log::info!("reached `{key}`"));

    let mut screen = Screen::default();
    let input = spawn_input();
    let tick = Duration::from_millis(args.tick_ms);
    screen.render(player.enter(start)?)?;
    while player.is_active() {
        let line = match input.recv_timeout(tick) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                screen.render(player.tick())?;
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let directives = match line.trim() {
            "" => player.advance(),
            "q" => Ok(player.exit()),
            number => match number.parse::<usize>() {
                Ok(number) if number > 0 => player.choose(number - 1),
                _ => Err(Error::InvalidChoice(0)),
            },
        };
        match directives {
            Ok(directives) => screen.render(directives)?,
            Err(Error::InvalidChoice(_)) => println!("  (pick one of the numbers above)"),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run(args: &Args) -> BoxResult<()> {
    let script = load_script(&args.scripts)?;
    if args.check {
        check(&script, args.start.as_deref());
        return Ok(());
    }
    let portraits = load_portraits(args.portraits.as_deref())?;
    log::debug!("{} portraits", portraits.len());
    let start = args
        .start
        .as_deref()
        .ok_or("`--start` is required unless `--check` is given")?;
    play(args, &script, &portraits, start)
}

fn main() -> ExitCode {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

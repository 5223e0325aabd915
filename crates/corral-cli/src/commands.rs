//! Handler functions for CLI commands.

use crate::cli::{Command, ConfigAction, ExperimentArgs};
use crate::config::{CorralConfig, PROJECT_NAME};
use anyhow::{Context, Result, bail};
use corral_core::{Game, PayoffTree, unitary as build_unitary};
use corral_sim::{
    CorrelationKind, ExperimentConfig, default_report_name, play_once, run_comparison,
    save_averages, save_progress, two_agent_distribution,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Dispatch
// ============================================================================

/// Runs `command` with the loaded configuration; `config_path` is the
/// explicit `--config` file, if any.
pub fn run(config: &CorralConfig, config_path: Option<&Path>, command: Command) -> Result<()> {
    match command {
        Command::Chsh {
            experiment,
            tests,
            output,
        } => chsh(config, &experiment, tests, output.as_deref()).map(|_| ()),
        Command::Play {
            game,
            coordinated,
            correlation,
            experiment,
            progress,
        } => play(
            config,
            &game,
            coordinated,
            correlation,
            &experiment,
            progress.as_deref(),
        ),
        Command::Sample {
            correlation,
            first,
            second,
            register_size,
            trials,
            seed,
        } => sample(correlation, &first, &second, register_size, trials, seed),
        Command::Unitary { params } => unitary(&params),
        Command::Config { action } => self::config(config_path, action),
    }
}

/// Applies command-line overrides to the configured experiment.
pub fn experiment_config(
    base: &ExperimentConfig,
    args: &ExperimentArgs,
    tests: Option<usize>,
) -> ExperimentConfig {
    let mut config = base.clone();
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(memory_size) = args.memory_size {
        config.memory_size = memory_size;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.learning_rate = learning_rate;
    }
    if let Some(register_size) = args.register_size {
        config.register_size = register_size;
    }
    if let Some(tests) = tests {
        config.tests_count = tests;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.adversarial |= args.adversarial;
    config
}

// ============================================================================
// chsh
// ============================================================================

/// Runs the CHSH comparison and writes the averages file; returns its path.
pub fn chsh(
    config: &CorralConfig,
    args: &ExperimentArgs,
    tests: Option<usize>,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let experiment = experiment_config(&config.experiment, args, tests);
    experiment.validate()?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_report_name(experiment.tests_count)));

    let report = run_comparison(&Game::chsh(), &experiment, |outcome| {
        tracing::info!(
            trial = outcome.trial,
            classical = outcome.classical,
            quantum = outcome.quantum,
            "Trial {} of {}",
            outcome.trial,
            experiment.tests_count
        );
    })?;
    save_averages(&path, &report)?;

    if let Some((classical, quantum)) = report.final_averages() {
        println!("Average final payoff of classical automata: {classical:.4}");
        println!("Average final payoff of quantum automata:   {quantum:.4}");
    }
    println!("Averages written to {}", path.display());
    Ok(path)
}

// ============================================================================
// play
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GameFile {
    payoffs: PayoffTree,
    #[serde(default)]
    coordinated: bool,
}

/// Loads `chsh` or a TOML/JSON game file holding a `payoffs` tree.
pub fn load_game(source: &str, coordinated: bool) -> Result<Game> {
    if source.eq_ignore_ascii_case("chsh") {
        return Ok(Game::chsh());
    }
    let path = Path::new(source);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read game file {}", path.display()))?;
    let file: GameFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
    };
    let tree = if coordinated || file.coordinated {
        file.payoffs.coordinated()
    } else {
        file.payoffs
    };
    Game::from_tree(&tree).with_context(|| format!("Invalid game in {}", path.display()))
}

/// Plays a game once and prints the final mean payoff.
pub fn play(
    config: &CorralConfig,
    game: &str,
    coordinated: bool,
    correlation: CorrelationKind,
    args: &ExperimentArgs,
    progress_path: Option<&Path>,
) -> Result<()> {
    let game = load_game(game, coordinated)?;
    let experiment = experiment_config(&config.experiment, args, None);
    let mut rng = experiment.rng();
    tracing::info!(
        players = game.player_count(),
        bayesian = game.is_bayesian(),
        %correlation,
        iterations = experiment.iterations,
        "Playing game"
    );
    let progress = play_once(&game, correlation, &experiment, &mut rng)?;
    if let Some(path) = progress_path {
        save_progress(path, &progress)?;
    }
    let last = progress.last().copied().unwrap_or_default();
    println!("Final mean payoff ({correlation}): {last:.4}");
    Ok(())
}

// ============================================================================
// sample
// ============================================================================

/// Relative frequency of every pair of observables of two agents.
pub fn sample_joint(
    kind: CorrelationKind,
    first: &[f64],
    second: &[f64],
    register_size: usize,
    trials: usize,
    seed: Option<u64>,
) -> Result<Vec<Vec<f64>>> {
    if trials == 0 {
        bail!("--trials must be at least 1");
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    // Bounds `register_size`, and with it the table below.
    let mut correlation = kind.build(register_size)?;
    let a = correlation.register_agent();
    let b = correlation.register_agent();

    let mut counts = vec![vec![0u64; register_size]; register_size];
    for _ in 0..trials {
        correlation.prepare(&mut rng)?;
        correlation.local_operation(a, first)?;
        correlation.local_operation(b, second)?;
        correlation.observe(&mut rng)?;
        counts[correlation.observable(a)?][correlation.observable(b)?] += 1;
    }
    Ok(counts
        .into_iter()
        .map(|row| row.into_iter().map(|c| c as f64 / trials as f64).collect())
        .collect())
}

fn print_table(title: &str, table: &[Vec<f64>]) {
    println!("{title}");
    print!("{:>8}", "");
    for b in 0..table.len() {
        print!("{:>8}", format!("b={b}"));
    }
    println!();
    for (a, row) in table.iter().enumerate() {
        print!("{:>8}", format!("a={a}"));
        for p in row {
            print!("{p:>8.4}");
        }
        println!();
    }
}

/// Samples two agents' observables and prints their joint distribution.
pub fn sample(
    kind: CorrelationKind,
    first: &[f64],
    second: &[f64],
    register_size: usize,
    trials: usize,
    seed: Option<u64>,
) -> Result<()> {
    let sampled = sample_joint(kind, first, second, register_size, trials, seed)?;
    print_table(&format!("Sampled ({kind}, {trials} plays):"), &sampled);

    if let (CorrelationKind::Classical, [f0, f1], [s0, s1]) = (kind, first, second) {
        match two_agent_distribution([*f0, *f1], [*s0, *s1]) {
            Ok(exact) => {
                let exact: Vec<Vec<f64>> = exact.iter().map(|row| row.to_vec()).collect();
                print_table("Exact:", &exact);
            }
            Err(err) => tracing::warn!(%err, "No exact distribution for these weights"),
        }
    }
    Ok(())
}

// ============================================================================
// unitary
// ============================================================================

/// Prints the unitary matrix for `params`.
pub fn unitary(params: &[f64]) -> Result<()> {
    let matrix = build_unitary(params)?;
    println!("{matrix}");
    tracing::debug!(unitary = matrix.is_unitary(1e-9), "Checked unitarity");
    Ok(())
}

// ============================================================================
// config
// ============================================================================

/// Handles a config subcommand.
pub fn config(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => config_path_command(config_path),
        ConfigAction::Show => {
            let config = CorralConfig::load(config_path)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = config_init(file.as_deref().or(config_path), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
    }
}

fn config_path_command(config_path: Option<&Path>) -> Result<()> {
    let Some(path) = CorralConfig::resolve_config_path(config_path) else {
        bail!("Could not determine config directory for this platform");
    };
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist, run `{PROJECT_NAME} config init` to create it)");
    }
    Ok(())
}

/// Writes the default configuration; returns the path written.
pub fn config_init(file: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => CorralConfig::default_config_path()
            .context("Could not determine config directory for this platform")?,
    };
    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, CorralConfig::default().to_toml_string()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_configured_values() {
        let base = ExperimentConfig {
            iterations: 500,
            seed: Some(1),
            ..ExperimentConfig::default()
        };
        let args = ExperimentArgs {
            iterations: Some(20),
            adversarial: true,
            ..ExperimentArgs::default()
        };
        let config = experiment_config(&base, &args, Some(4));
        assert_eq!(config.iterations, 20);
        assert_eq!(config.tests_count, 4);
        assert_eq!(config.seed, Some(1));
        assert!(config.adversarial);
        assert_eq!(config.memory_size, base.memory_size);
    }

    #[test]
    fn test_chsh_writes_averages_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("averages.csv");
        let args = ExperimentArgs {
            iterations: Some(10),
            seed: Some(5),
            ..ExperimentArgs::default()
        };
        let path = chsh(&CorralConfig::default(), &args, Some(2), Some(&output)).unwrap();
        assert_eq!(path, output);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 11);
    }

    #[test]
    fn test_load_game_from_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("game.toml");
        std::fs::write(&toml_path, "payoffs = [[1, -1], [-1, 1]]\ncoordinated = true\n").unwrap();
        let game = load_game(toml_path.to_str().unwrap(), false).unwrap();
        assert_eq!(game.player_count(), 2);
        assert_eq!(game.payoffs(&[0, 0], &[0, 0]).unwrap(), &[1.0, 1.0]);

        let json_path = dir.path().join("game.json");
        std::fs::write(&json_path, r#"{"payoffs": [[[1, 0], [0, 1]], [[0, 1], [1, 0]]]}"#).unwrap();
        let game = load_game(json_path.to_str().unwrap(), false).unwrap();
        assert_eq!(game.choice_counts(), &[2, 2]);
        assert!(!game.is_bayesian());
    }

    #[test]
    fn test_load_builtin_chsh() {
        assert_eq!(load_game("CHSH", false).unwrap(), Game::chsh());
    }

    #[test]
    fn test_load_missing_game_fails() {
        assert!(load_game("/nonexistent/game.toml", false).is_err());
    }

    #[test]
    fn test_play_with_progress_file() {
        let dir = tempfile::tempdir().unwrap();
        let progress = dir.path().join("progress.csv");
        let args = ExperimentArgs {
            iterations: Some(15),
            seed: Some(2),
            ..ExperimentArgs::default()
        };
        play(
            &CorralConfig::default(),
            "chsh",
            false,
            CorrelationKind::Classical,
            &args,
            Some(&progress),
        )
        .unwrap();
        let text = std::fs::read_to_string(&progress).unwrap();
        assert_eq!(text.lines().count(), 16);
    }

    #[test]
    fn test_sample_joint_is_a_distribution() {
        let not = [0.5, 0.0, 0.0, 0.0];
        let z = [0.0, 0.0, 0.0, 0.0];
        let joint = sample_joint(CorrelationKind::Quantum, &not, &z, 2, 500, Some(3)).unwrap();
        // One agent flipping its value makes the observables always differ.
        assert_eq!(joint[0][0], 0.0);
        assert_eq!(joint[1][1], 0.0);
        assert!((joint[0][1] + joint[1][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_rejects_wrong_parameter_count() {
        let kind = CorrelationKind::Classical;
        assert!(sample_joint(kind, &[1.0], &[1.0, 1.0], 2, 10, Some(0)).is_err());
        assert!(sample_joint(kind, &[1.0, 1.0], &[1.0, 1.0], 2, 0, Some(0)).is_err());
    }

    #[test]
    fn test_sample_rejects_oversized_register() {
        for kind in CorrelationKind::ALL {
            let err = sample_joint(kind, &[1.0], &[1.0], usize::MAX / 2, 1, Some(0)).unwrap_err();
            assert!(err.to_string().contains("at most"), "{err}");
        }
    }

    #[test]
    fn test_unitary_rejects_non_square() {
        assert!(unitary(&[0.5, 0.0, 0.0, 0.0]).is_ok());
        assert!(unitary(&[0.5, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_run_config_uses_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explicit.toml");
        let command = Command::Config {
            action: ConfigAction::Init {
                file: None,
                force: false,
            },
        };
        run(&CorralConfig::default(), Some(&path), command).unwrap();
        assert_eq!(CorralConfig::load(Some(&path)).unwrap(), CorralConfig::default());
    }

    #[test]
    fn test_config_init_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        config_init(Some(&path), false).unwrap();
        assert!(config_init(Some(&path), false).is_err());
        config_init(Some(&path), true).unwrap();
        let loaded = CorralConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, CorralConfig::default());
    }
}

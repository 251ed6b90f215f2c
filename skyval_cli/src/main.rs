use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use skyval_core::{
    layout, poem, Bouquet, EngineParams, Journey, OutcomeKind, ReelState, Scene, SeedStream,
    SlotSession, Symbol, Vault, VaultAttempt,
};
use skyval_shared::{
    answered_link, decode_gift, encode_gift, gift_from_url, gift_url, landing_bouquet,
    location_hash, FileStore, Progress, ProgressStore, SpinLogEntry,
};

mod reels;

#[derive(Parser)]
#[command(name = "skyval", about = "Drive the skyval greeting from a terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Directory holding the persisted progress
    #[arg(long, env = "SKYVAL_STATE_DIR", default_value = ".skyval", global = true)]
    state_dir: PathBuf,
    /// Page URL used when building share links
    #[arg(long, env = "SKYVAL_BASE_URL", default_value = "http://localhost:8080/", global = true)]
    base_url: url::Url,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sticker placements for a bouquet as JSON
    Place { ids: Vec<String> },
    /// Print the poem a bouquet writes
    Poem { ids: Vec<String> },
    /// Encode or decode gift links
    Gift {
        #[command(subcommand)]
        action: GiftAction,
    },
    /// Seal a bouquet (3 to 7 flowers): prints the gift link and unlocks the slots
    Seal { ids: Vec<String> },
    /// One spin with explicit reels and holds
    Spin {
        /// Current reels, e.g. KISS,LEGO,LONG_HUG
        #[arg(long, value_delimiter = ',')]
        reels: Option<Vec<String>>,
        /// Reels to hold (0-based)
        #[arg(long, value_delimiter = ',')]
        held: Vec<usize>,
        #[command(flatten)]
        seeds: Seeds,
    },
    /// Play the slot scene until the first win or until the spins run out
    Play {
        /// Stop after this many spins even without a win
        #[arg(long, default_value_t = 100)]
        max_spins: u32,
        /// Hold the matching reels after a pair
        #[arg(long)]
        hold_pairs: bool,
        /// Animation speed factor; 0 skips the reel timers
        #[arg(long, default_value_t = 0.0, value_parser = parse_speed)]
        speed: f64,
        /// Write every spin to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        #[command(flatten)]
        seeds: Seeds,
    },
    /// Try the memory vault password
    Vault { password: String },
    /// Say yes; prints the link that reopens the answered page
    Answer,
    /// Show where the journey stands, optionally as opened from a URL
    Journey {
        #[arg(long)]
        url: Option<url::Url>,
        /// Fragment as `location.hash` reports it, e.g. `#yes`; overrides the URL's
        #[arg(long)]
        fragment: Option<String>,
    },
    /// Inspect, advance or reset persisted progress
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
}

#[derive(Subcommand)]
enum GiftAction {
    Encode { ids: Vec<String> },
    /// Accepts a bare payload or a full link
    Decode { payload: String },
}

#[derive(Subcommand)]
enum ProgressAction {
    Show,
    /// Unlock the next scene without playing it
    Unlock,
    Reset,
}

#[derive(clap::Args)]
struct Seeds {
    #[arg(long, env = "SKYVAL_SERVER_SEED", default_value = "skyval-dev-seed")]
    server_seed: String,
    /// Defaults to the current time in milliseconds
    #[arg(long)]
    client_seed: Option<String>,
    /// First nonce; each spin uses the next one
    #[arg(long, default_value_t = 1)]
    nonce: u64,
}

impl Seeds {
    fn client_seed(&self) -> String {
        self.client_seed
            .clone()
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string())
    }
}

fn parse_bouquet(ids: &[String]) -> anyhow::Result<Bouquet> {
    let mut bouquet = Bouquet::new();
    for id in ids {
        bouquet.add(id).with_context(|| format!("cannot add {id:?}"))?;
    }
    Ok(bouquet)
}

/// Largest accepted `--speed`; ten times slower than the page is plenty.
const MAX_SPEED: f64 = 10.0;

fn parse_speed(raw: &str) -> Result<f64, String> {
    let speed: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if !(0.0..=MAX_SPEED).contains(&speed) {
        return Err(format!("speed must be between 0 and {MAX_SPEED}"));
    }
    Ok(speed)
}

/// Nonces for `count` consecutive spins starting at `first`.
fn nonce_range(first: u64, count: u32) -> anyhow::Result<std::ops::Range<u64>> {
    let end = first
        .checked_add(u64::from(count))
        .with_context(|| format!("nonce {first} leaves no room for {count} spins"))?;
    Ok(first..end)
}

fn require_scene(journey: &mut Journey, scene: Scene) -> anyhow::Result<()> {
    journey
        .show(scene)
        .with_context(|| format!("{} is not reachable yet", scene.progress_label()))
}

fn save_journey(store: &mut FileStore, journey: &Journey) -> anyhow::Result<()> {
    store.save(&Progress::new(journey.unlocked().number()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let mut store = FileStore::in_dir(&cli.state_dir);

    match cli.command {
        Commands::Place { ids } => {
            let placements = layout::place(&ids);
            println!("{}", serde_json::to_string_pretty(&placements)?);
        }
        Commands::Poem { ids } => {
            println!("{}", poem::poem_for_ids(&ids));
        }
        Commands::Gift { action } => match action {
            GiftAction::Encode { ids } => {
                let bouquet = parse_bouquet(&ids)?;
                println!("{}", encode_gift(bouquet.flowers()));
                println!("{}", gift_url(&cli.base_url, bouquet.flowers()));
            }
            GiftAction::Decode { payload } => {
                let flowers = match url::Url::parse(&payload) {
                    Ok(link) => gift_from_url(&link).unwrap_or_default(),
                    Err(_) => decode_gift(&payload),
                };
                let ids: Vec<&str> = flowers.iter().map(|f| f.id()).collect();
                println!("{}", serde_json::to_string(&ids)?);
            }
        },
        Commands::Seal { ids } => {
            let bouquet = parse_bouquet(&ids)?;
            if !bouquet.can_seal() {
                bail!(
                    "a bouquet needs at least {} flowers ({})",
                    skyval_core::MIN_TO_SEAL,
                    bouquet.counter_label()
                );
            }
            let mut journey = Journey::boot(store.load().unlocked, None);
            require_scene(&mut journey, Scene::Bouquet)?;
            println!("{}\n", poem::poem(bouquet.flowers()));
            println!("{}", gift_url(&cli.base_url, bouquet.flowers()));
            journey.unlock_next();
            save_journey(&mut store, &journey)?;
        }
        Commands::Spin { reels, held, seeds } => {
            let mut state = ReelState::default();
            if let Some(reels) = reels {
                let parsed: Vec<Symbol> = reels.iter().map(|r| Symbol::parse(r)).collect();
                let Ok(symbols) = <[Symbol; 3]>::try_from(parsed) else {
                    bail!("--reels needs exactly three symbols");
                };
                state.symbols = symbols;
            }
            let mut session = SlotSession::with_state(state, EngineParams::default());
            for reel in held {
                session.toggle_hold(reel)?;
            }
            let mut rng = SeedStream::new(&seeds.server_seed, seeds.client_seed(), seeds.nonce);
            let settled = session.spin_now(&mut rng)?;
            println!(
                "server_seed_hash={} client_seed={} nonce={}",
                rng.server_seed_hash_hex(),
                rng.client_seed,
                rng.nonce
            );
            println!("{}", serde_json::to_string_pretty(&settled)?);
        }
        Commands::Play {
            max_spins,
            hold_pairs,
            speed,
            csv: csv_path,
            seeds,
        } => {
            let nonces = nonce_range(seeds.nonce, max_spins)?;
            let mut journey = Journey::boot(store.load().unlocked, None);
            require_scene(&mut journey, Scene::Slots)?;

            let client_seed = seeds.client_seed();
            let mut session = SlotSession::new(EngineParams::default());
            let mut log = Vec::new();
            info!(server_seed_hash = %skyval_core::derive_hash_hex(seeds.server_seed.as_bytes()), %client_seed, "slots open");

            for nonce in nonces {
                if !session.can_spin() {
                    println!("{}", skyval_core::paytable::OUT_OF_SPINS_LINE);
                    break;
                }
                let mut rng = SeedStream::new(&seeds.server_seed, &client_seed, nonce);
                let settled = reels::animated_spin(&mut session, &mut rng, speed).await?;
                let outcome = &settled.outcome;
                println!(
                    "#{:<4} {:<40} {} ({} left)",
                    nonce,
                    outcome.triple.map(Symbol::pretty).join(" | "),
                    outcome.title(),
                    settled.spins_left
                );
                if outcome.bonus_spins > 0 {
                    let plural = if outcome.bonus_spins > 1 { "s" } else { "" };
                    println!("      +{} Free Spin{plural}", outcome.bonus_spins);
                }
                log.push(SpinLogEntry::from_settled(Utc::now(), nonce, &settled));

                if hold_pairs {
                    let wanted = match outcome.kind {
                        OutcomeKind::Pair(sym) => outcome.triple.map(|s| s == sym),
                        _ => [false; 3],
                    };
                    // Releases go first so the hold cap is never hit mid-way.
                    for hold in [false, true] {
                        for reel in 0..3 {
                            let held = session.state().held[reel];
                            if held != wanted[reel] && wanted[reel] == hold {
                                session.toggle_hold(reel)?;
                            }
                        }
                    }
                }

                if settled.unlocked_next {
                    println!("{}", outcome.subtitle());
                    journey.unlock_next();
                    save_journey(&mut store, &journey)?;
                    break;
                }
            }

            if let Some(path) = csv_path {
                let mut wtr = csv::Writer::from_path(&path)?;
                wtr.write_record(SpinLogEntry::CSV_HEADER)?;
                for entry in &log {
                    wtr.write_record(entry.csv_record())?;
                }
                wtr.flush()?;
                println!("Exported {} spins to {}", log.len(), path.display());
            }
        }
        Commands::Vault { password } => {
            let mut journey = Journey::boot(store.load().unlocked, None);
            require_scene(&mut journey, Scene::Vault)?;
            let mut vault = Vault::default();
            match vault.attempt(&password) {
                VaultAttempt::TooShort => println!("two letters 🙂"),
                VaultAttempt::Wrong => println!("nope. think 🍔👑"),
                VaultAttempt::Opened => {
                    println!("Vault unlocked ✨");
                    journey.unlock_next();
                    save_journey(&mut store, &journey)?;
                }
            }
        }
        Commands::Answer => {
            let mut journey = Journey::boot(store.load().unlocked, None);
            require_scene(&mut journey, Scene::Question)?;
            journey.answer_yes();
            println!("{}", answered_link(&cli.base_url));
        }
        Commands::Journey { url, fragment } => {
            let fragment = fragment.or_else(|| url.as_ref().and_then(location_hash));
            let journey = Journey::boot(store.load().unlocked, fragment.as_deref());
            println!("{}", journey.scene().progress_label());
            println!("unlocked up to scene {}", journey.unlocked().number());
            if journey.is_answered() {
                println!("answered: yes");
            }
            if let Some(url) = &url {
                let ids: Vec<&str> = landing_bouquet(url).iter().map(|f| f.id()).collect();
                println!("landing bouquet: {}", ids.join(", "));
            }
        }
        Commands::Progress { action } => match action {
            ProgressAction::Show => {
                println!("{}", store.load().to_json()?);
            }
            ProgressAction::Unlock => {
                let mut journey = Journey::boot(store.load().unlocked, None);
                let scene = journey.unlock_next();
                save_journey(&mut store, &journey)?;
                println!("{}", scene.progress_label());
            }
            ProgressAction::Reset => {
                store.clear()?;
                println!("progress cleared ({})", store.path().display());
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_must_be_finite_and_bounded() {
        assert_eq!(parse_speed("0"), Ok(0.0));
        assert_eq!(parse_speed("1.5"), Ok(1.5));
        assert!(parse_speed("1e300").is_err());
        assert!(parse_speed("inf").is_err());
        assert!(parse_speed("NaN").is_err());
        assert!(parse_speed("-1").is_err());
        assert!(parse_speed("fast").is_err());
    }

    #[test]
    fn nonce_range_refuses_overflow() {
        assert_eq!(nonce_range(1, 3).unwrap(), 1..4);
        assert_eq!(nonce_range(u64::MAX - 2, 2).unwrap().count(), 2);
        assert!(nonce_range(u64::MAX, 2).is_err());
    }

    #[test]
    fn play_rejects_huge_speed_at_parse_time() {
        let err = Cli::try_parse_from(["skyval", "play", "--speed", "1e300"]);
        assert!(err.is_err());
        let ok = Cli::try_parse_from(["skyval", "play", "--speed", "2", "--nonce", "7"]);
        assert!(ok.is_ok());
    }
}

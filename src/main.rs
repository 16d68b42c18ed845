//! Emberforge - craft items from materials, then duel with the results
//!
//! This is the command line entry point. It wires settings, the material
//! catalog, the crafting cache and the generation client into an
//! [`ItemFactory`], then dispatches to the `craft`, `duel` and
//! `materials` subcommands.

mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use emberforge_core::{
    GeneratedItem, ItemKind, Material, MaterialCatalog, MaterialCategory, StatBlock, WeaponStyle,
};
use emberforge_game::combat::{CombatSession, Combatant};
use emberforge_integration::{GenerationCache, GenerativeClient, ItemFactory};

use settings::Settings;

/// Starting health for both duelists.
const DUEL_HEALTH: f32 = 100.0;

#[derive(Parser, Debug)]
#[command(name = "emberforge")]
#[command(about = "Craft items from materials and duel with the results")]
#[command(version)]
struct Cli {
    /// Skip the generation service and craft with the deterministic fallback
    #[arg(long, global = true)]
    offline: bool,

    /// TOML file overriding the built-in material catalog
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Craft an item from three materials
    Craft {
        /// Exactly three material identifiers
        #[arg(num_args = 3, value_name = "MATERIAL")]
        materials: Vec<String>,

        /// Item kind (weapon, armor or buff) instead of inferring it
        #[arg(long)]
        kind: Option<String>,

        /// Weapon style (sword, axe or spear)
        #[arg(long)]
        style: Option<String>,
    },

    /// Craft two full loadouts and fight them against each other
    Duel {
        /// Seed for a reproducible fight
        #[arg(long)]
        seed: Option<u64>,

        /// Turns before the duel is called a draw
        #[arg(long)]
        turns: Option<u32>,
    },

    /// List the material catalog grouped by category
    Materials,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let cli = Cli::parse();
    let settings = Settings::load();
    let catalog = Arc::new(load_catalog(cli.catalog.as_deref())?);

    match cli.command {
        Command::Materials => {
            list_materials(&catalog);
            Ok(())
        }
        Command::Craft {
            materials,
            kind,
            style,
        } => {
            let factory = build_factory(&settings, cli.offline, catalog).await?;
            let result = run_craft(&factory, &materials, kind.as_deref(), style.as_deref()).await;
            persist_cache(&factory, &settings);
            result
        }
        Command::Duel { seed, turns } => {
            let factory = build_factory(&settings, cli.offline, catalog).await?;
            let result = run_duel(&factory, &settings, seed, turns).await;
            persist_cache(&factory, &settings);
            result
        }
    }
}

/// Materials file shape: `[[materials]]` tables with id, name, category
/// and base_weight.
#[derive(Debug, Deserialize)]
struct MaterialsFile {
    materials: Vec<Material>,
}

fn load_catalog(path: Option<&Path>) -> Result<MaterialCatalog> {
    let Some(path) = path else {
        return Ok(MaterialCatalog::builtin());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read materials file {:?}", path))?;
    let file: MaterialsFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse materials file {:?}", path))?;
    info!("Loaded {} materials from {:?}", file.materials.len(), path);
    Ok(MaterialCatalog::from_materials(file.materials))
}

/// Build the factory: cache (optionally warmed from disk) plus the
/// generation client, unless offline mode or settings disable it.
async fn build_factory(
    settings: &Settings,
    offline: bool,
    catalog: Arc<MaterialCatalog>,
) -> Result<ItemFactory<GenerativeClient>> {
    let cache = match settings.cache.capacity {
        Some(capacity) => GenerationCache::with_capacity(capacity),
        None => GenerationCache::new(),
    };
    if let Some(path) = &settings.cache.persist_path {
        let loaded = cache.load_from(path);
        if loaded > 0 {
            info!("Warmed cache with {} items from {:?}", loaded, path);
        }
    }

    let client = if offline || !settings.generation.enabled {
        info!("Generation service disabled, crafting with the fallback");
        None
    } else {
        let client = GenerativeClient::new(
            &settings.generation.service_url,
            Duration::from_secs(settings.generation.timeout_secs),
            catalog.clone(),
        )
        .context("Failed to build generation client")?;
        if client.health().await {
            info!("Generation service reachable at {}", client.base_url());
        } else {
            warn!(
                "Generation service unreachable at {}, fallback will cover failures",
                client.base_url()
            );
        }
        Some(client)
    };

    Ok(ItemFactory::new(catalog, Arc::new(cache), client))
}

fn persist_cache(factory: &ItemFactory<GenerativeClient>, settings: &Settings) {
    if let Some(path) = &settings.cache.persist_path {
        factory.cache().persist_to(path);
    }
}

async fn run_craft(
    factory: &ItemFactory<GenerativeClient>,
    materials: &[String],
    kind: Option<&str>,
    style: Option<&str>,
) -> Result<()> {
    let kind = match kind {
        Some(value) => Some(
            ItemKind::parse(value)
                .with_context(|| format!("Unknown item kind '{}', expected weapon, armor or buff", value))?,
        ),
        None => None,
    };
    let style = match style {
        Some(value) => Some(
            WeaponStyle::parse(value)
                .with_context(|| format!("Unknown weapon style '{}', expected sword, axe or spear", value))?,
        ),
        None => None,
    };

    let ids: Vec<&str> = materials.iter().map(String::as_str).collect();
    let item = factory.craft(&ids, kind, style).await?;
    print_item(&item);
    Ok(())
}

/// Two showcase loadouts covering the whole built-in catalog: each side
/// gets a weapon, an armor piece and a buff.
const FIRST_LOADOUT: [[&str; 3]; 3] = [
    ["steel_ingot", "iron_blade", "dragon_shard"],
    ["thick_leather", "steel_plate", "dragon_scale"],
    ["magic_essence", "crystal_powder", "phoenix_feather"],
];
const SECOND_LOADOUT: [[&str; 3]; 3] = [
    ["obsidian_shard", "mithril_bar", "dark_crystal"],
    ["reinforced_wood", "titanium_sheet", "stone"],
    ["moonflower", "dragon_essence", "star_dust"],
];

async fn run_duel(
    factory: &ItemFactory<GenerativeClient>,
    settings: &Settings,
    seed: Option<u64>,
    turns: Option<u32>,
) -> Result<()> {
    let mut first = Combatant::new("Aldren", DUEL_HEALTH);
    for triple in FIRST_LOADOUT {
        let item = factory.craft(&triple, None, None).await?;
        println!("Aldren equips {} [{}]", item.name, item.rarity.name());
        first.loadout.equip_any(item);
    }

    let mut second = Combatant::new("Brakk", DUEL_HEALTH);
    for triple in SECOND_LOADOUT {
        let item = factory.craft(&triple, None, None).await?;
        println!("Brakk equips {} [{}]", item.name, item.rarity.name());
        second.loadout.equip_any(item);
    }

    let mut session = match seed {
        Some(seed) => CombatSession::with_seed(first, second, seed),
        None => CombatSession::new(first, second),
    };
    session = session.with_turn_limit(turns.unwrap_or(settings.combat.turn_limit));

    println!();
    let outcome = session.run_auto();
    for line in session.log() {
        println!("{}", line);
    }

    println!();
    let [first, second] = session.combatants();
    println!(
        "After {} turns: {} {:.1} health, {} {:.1} health",
        session.turn(),
        first.name,
        first.health,
        second.name,
        second.health
    );
    println!("Outcome: {}", outcome.name());
    Ok(())
}

fn list_materials(catalog: &MaterialCatalog) {
    for category in [
        MaterialCategory::Weapon,
        MaterialCategory::Armor,
        MaterialCategory::Concoction,
    ] {
        println!("{}:", category.name());
        for material in catalog.by_category(category) {
            println!(
                "  {:<18} {:<18} weight {:.2}",
                material.id, material.name, material.base_weight
            );
        }
    }
}

fn print_item(item: &GeneratedItem) {
    println!("{} [{}]", item.name, item.rarity.name());
    println!("  {}", item.description);
    match &item.stats {
        StatBlock::Weapon { damage, crit_chance } => {
            println!("  Damage {:.1}, crit chance {:.0}%", damage, crit_chance * 100.0);
        }
        StatBlock::Armor {
            defense,
            block_chance,
        } => {
            println!("  Defense {:.1}, block chance {:.0}%", defense, block_chance * 100.0);
        }
        StatBlock::Buff {
            effect_magnitude,
            duration,
        } => {
            println!("  Magnitude {:.1} over {} turns", effect_magnitude, duration);
        }
    }
    for effect in &item.effects {
        println!(
            "  Effect: {} ({:.1} for {} turns)",
            effect.kind.as_str(),
            effect.magnitude,
            effect.duration
        );
    }
    if item.is_fallback() {
        println!("  Crafted offline from material weights");
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use gridiron_agent::llm::CompletionParams;
use gridiron_agent::prompts::{PromptBuilder, ANALYST_INSTRUCTIONS};
use gridiron_agent::retry::RetryConfig;
use gridiron_agent::tool_registry::ToolRegistry;
use gridiron_agent::tools::{register_league_tools, ToolContext};
use gridiron_agent::{providers, AnalysisEngine};
use gridiron_core::GridironConfig;
use gridiron_league::{EspnClient, League, SeasonPhase, Team};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "gridiron.toml")]
    config: String,

    /// Print the assembled prompt and tool schema instead of calling the LLM
    #[arg(long)]
    debug: bool,

    /// Invoke a single tool directly and print its result (no LLM)
    #[arg(long, value_name = "TOOL")]
    probe: Option<String>,

    /// JSON arguments for --probe
    #[arg(long, value_name = "JSON", default_value = "{}")]
    probe_input: String,

    /// League id override
    #[arg(long)]
    league: Option<u64>,

    /// Season year override
    #[arg(long)]
    year: Option<u16>,

    /// Model override
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Fatal: {:#}", e);
        eprintln!("\nError: {:#}", e);
        eprintln!("\nTroubleshooting:");
        eprintln!("1. Check your ESPN credentials (ESPN_S2 / SWID) are current");
        eprintln!("2. Ensure your LLM API key is set in .env");
        eprintln!("3. Verify you have access to the league");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = GridironConfig::load_or_default(&args.config);
    if let Some(id) = args.league {
        config.league.league_id = id;
    }
    if let Some(year) = args.year {
        config.league.season = year;
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    config.validate()?;

    println!("Fantasy Football AI Advisor");
    println!("{}", "=".repeat(50));

    info!("Connecting to ESPN Fantasy...");
    let credentials = config
        .league
        .espn_s2
        .as_deref()
        .zip(config.league.swid.as_deref());
    let client = Arc::new(EspnClient::new(
        config.league.league_id,
        config.league.season,
        credentials,
    )?);
    let league = Arc::new(
        client
            .fetch_league()
            .await
            .context("Failed to load league data from ESPN")?,
    );

    let my_team = resolve_my_team(&league, &config)?;
    println!("Connected to: {}", league.name);
    println!("Your team: {}", my_team.name);
    match league.season_phase() {
        SeasonPhase::Preseason => println!("Current week: Pre-season"),
        SeasonPhase::InSeason { week } => println!("Current week: {}", week),
    }
    println!("{}", "-".repeat(50));

    // Tool layer is available in every mode, including pre-season probing
    let ctx = Arc::new(ToolContext {
        client: client.clone(),
        league: league.clone(),
        my_team_id: my_team.id,
        retry: RetryConfig::with_max_attempts(config.agent.max_attempts),
    });
    let mut registry = ToolRegistry::new();
    register_league_tools(&mut registry, ctx)?;

    if let Some(tool) = &args.probe {
        let input: serde_json::Value = serde_json::from_str(&args.probe_input)
            .context("--probe-input must be valid JSON")?;
        let outcome = registry.dispatch(tool, &input).await;
        if outcome.is_error {
            println!("Tool error: {}", outcome.content);
        } else {
            println!("{}", outcome.content);
        }
        return Ok(());
    }

    if league.season_phase() == SeasonPhase::Preseason {
        print_preseason_notice();
        return Ok(());
    }

    let kickoff = PromptBuilder::kickoff_prompt(&league, my_team);

    let llm = providers::from_config(&config.llm)?;
    let engine = Arc::new(AnalysisEngine::new(
        llm,
        registry,
        ANALYST_INSTRUCTIONS.to_string(),
        config.agent.max_turns,
        CompletionParams {
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        },
    ));

    if args.debug {
        println!("\nDEBUG MODE - request payload");
        println!("{}", "-".repeat(50));
        let rendered = engine.render_debug(&kickoff);
        println!("{}", rendered);
        println!("{}", "-".repeat(50));
        println!("\nPayload length: {} characters", rendered.len());
        return Ok(());
    }

    // Ctrl-C cancels at the next suspension point
    {
        let engine = engine.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling analysis");
                engine.cancel();
            }
        });
    }

    println!("\nGenerating analysis (tool calls will be logged as they occur)...\n");
    let answer = engine.analyze(&kickoff).await?;

    println!("{}", answer);
    println!("\n{}", "=".repeat(50));
    println!("Analysis complete");
    Ok(())
}

fn resolve_my_team<'a>(league: &'a League, config: &GridironConfig) -> Result<&'a Team> {
    if let Some(team_id) = config.league.team_id {
        return league
            .team(team_id)
            .with_context(|| format!("Configured team_id {} not found in league", team_id));
    }
    let swid = config
        .league
        .swid
        .as_deref()
        .context("No SWID or team_id configured")?;
    league.identify_my_team(swid).with_context(|| {
        let teams: Vec<String> = league
            .teams
            .iter()
            .map(|t| format!("  {} - {}", t.id, t.name))
            .collect();
        format!(
            "Could not identify your team from SWID. Set [league] team_id to one of:\n{}",
            teams.join("\n")
        )
    })
}

fn print_preseason_notice() {
    println!("\nIt's currently pre-season!");
    println!("{}", "-".repeat(50));
    println!("\nThe season hasn't started yet. Come back when Week 1 begins to:");
    println!("  - Get AI-powered lineup recommendations");
    println!("  - Analyze start/sit decisions");
    println!("  - Review waiver wire targets");
    println!("  - Receive injury updates and matchup analysis");
    println!("\nFor now, you can still inspect data directly, e.g.:");
    println!("  gridiron --probe get_waiver_wire --probe-input '{{\"size\": 5}}'");
    println!("\n{}", "=".repeat(50));
    println!("Check back when the season starts!");
}

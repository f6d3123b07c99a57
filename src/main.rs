//! casino-desk command line front end
//!
//! Each subcommand is one back-office screen: it runs a query or a mutation
//! against the backend and prints the result as JSON.

use casino_desk::{
    api::ApiError,
    common::types::*,
    config::{generate_sample_config, validate, ConfigLoader, Environment},
    errors::DeskResult,
    export::{export_profile_to_interactive_html, load_snapshot, SnapshotOptions},
    notify::{run_mutation, TracingNotifier},
    services::DeskServices,
    ImageEmbedder,
};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use std::{future::Future, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Casino profile back-office
#[derive(Parser)]
#[command(name = "casino-desk")]
#[command(about = "Back-office client for casino profiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target environment (development or production)
    #[arg(short, long)]
    env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token issued by the backend
    Login {
        #[arg(long)]
        token: String,
    },
    /// Forget the stored token
    Logout,
    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    Casinos {
        #[command(subcommand)]
        action: CasinoCommand,
    },
    /// Profile values of a casino
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Profile field definitions
    Fields {
        #[command(subcommand)]
        action: FieldCommand,
    },
    /// Settings matrix contexts
    Contexts {
        #[command(subcommand)]
        action: ContextCommand,
    },
    /// Per-GEO settings matrix
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    Bonuses {
        #[command(subcommand)]
        action: BonusCommand,
    },
    Payments {
        #[command(subcommand)]
        action: PaymentCommand,
    },
    Promos {
        #[command(subcommand)]
        action: PromoCommand,
    },
    /// Test accounts and their transactions
    Accounts {
        #[command(subcommand)]
        action: AccountCommand,
    },
    Emails {
        #[command(subcommand)]
        action: EmailCommand,
    },
    Comments {
        #[command(subcommand)]
        action: CommentCommand,
    },
    Tags {
        #[command(subcommand)]
        action: TagCommand,
    },
    /// Change history of a casino
    History { casino_id: i64 },
    /// Write the interactive HTML report of a casino
    Export {
        casino_id: i64,
        /// Output directory, defaults to `export.output_dir`
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Keep remote image URLs instead of inlining them
        #[arg(long)]
        no_images: bool,
        /// Only include these GEOs
        #[arg(long = "geo")]
        geos: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a configuration file with default values
    Init { path: String },
}

#[derive(clap::Args)]
struct CasinoArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long = "geo")]
    geos: Vec<String>,
}

impl From<CasinoArgs> for NewCasino {
    fn from(args: CasinoArgs) -> Self {
        NewCasino {
            name: args.name,
            website: args.website,
            owner: args.owner,
            status: args.status,
            geos: args.geos,
        }
    }
}

#[derive(Subcommand)]
enum CasinoCommand {
    List,
    Show { id: i64 },
    Create(CasinoArgs),
    Update {
        id: i64,
        #[command(flatten)]
        casino: CasinoArgs,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show { casino_id: i64 },
    /// Set a value, or clear it when no value is given
    Set {
        casino_id: i64,
        field_id: i64,
        value: Option<String>,
    },
}

#[derive(Subcommand)]
enum FieldCommand {
    List,
    Create {
        #[arg(long)]
        key: String,
        #[arg(long)]
        label: String,
        #[arg(long = "type")]
        field_type: Option<String>,
        #[arg(long, default_value = "0")]
        order: i32,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ContextCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "0")]
        order: i32,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show {
        casino_id: i64,
        #[arg(long)]
        geo: Option<String>,
    },
    Set {
        casino_id: i64,
        #[arg(long)]
        field: i64,
        #[arg(long)]
        context: i64,
        #[arg(long)]
        geo: String,
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Subcommand)]
enum BonusCommand {
    List { casino_id: i64 },
    Create {
        casino_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        geo: String,
        #[arg(long, value_parser = parse_variant::<BonusKind>, default_value = "deposit")]
        kind: BonusKind,
        #[arg(long = "type", value_parser = parse_variant::<BonusType>, default_value = "cash")]
        bonus_type: BonusType,
        #[arg(long, value_parser = parse_variant::<BonusCategory>, default_value = "casino")]
        category: BonusCategory,
        #[arg(long)]
        min_deposit: Option<f64>,
        #[arg(long)]
        max_bonus: Option<f64>,
        #[arg(long)]
        max_cashout: Option<f64>,
        #[arg(long)]
        wager: Option<f64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        freespins: Option<u32>,
        #[arg(long)]
        valid_days: Option<u32>,
        #[arg(long)]
        promo_code: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete { id: i64 },
    /// List screenshots of a bonus
    Images { bonus_id: i64 },
}

#[derive(Subcommand)]
enum PaymentCommand {
    List { casino_id: i64 },
    Create {
        casino_id: i64,
        #[arg(long)]
        geo: String,
        #[arg(long)]
        direction: PaymentDirection,
        #[arg(long)]
        method: String,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        fee: Option<String>,
        #[arg(long)]
        processing_time: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete { id: i64 },
    /// List screenshots of a payment method
    Images { payment_id: i64 },
}

#[derive(Subcommand)]
enum PromoCommand {
    List { casino_id: i64 },
    Create {
        casino_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        geo: Option<String>,
        #[arg(long = "type")]
        promo_type: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AccountCommand {
    List { casino_id: i64 },
    Create {
        casino_id: i64,
        #[arg(long)]
        geo: String,
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete { id: i64 },
    /// List transactions of an account
    Transactions { account_id: i64 },
    /// Record a deposit or withdrawal on an account
    AddTransaction {
        account_id: i64,
        #[arg(long)]
        direction: PaymentDirection,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        method: Option<String>,
    },
}

#[derive(Subcommand)]
enum EmailCommand {
    List {
        #[arg(long)]
        casino: Option<i64>,
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long)]
        unread: bool,
    },
    Show { id: i64 },
    MarkRead {
        id: i64,
        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },
    /// Attach an email to a casino
    Link { id: i64, casino_id: i64 },
    /// Distinct recipient addresses
    Recipients,
}

#[derive(Subcommand)]
enum CommentCommand {
    List { casino_id: i64 },
    Add {
        casino_id: i64,
        /// Comment body, HTML allowed
        #[arg(long)]
        text: String,
        #[arg(long = "tag")]
        tags: Vec<i64>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TagCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
    Delete { id: i64 },
    Attach { comment_id: i64, tag_id: i64 },
    Detach { comment_id: i64, tag_id: i64 },
}

/// Parse a snake_case enum value the way the backend spells it
fn parse_variant<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized)).map_err(|_| format!("unknown value '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> DeskResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("casino_desk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Run a mutation, printing per-field problems when the backend rejects input
async fn mutate<T, F>(services: &DeskServices, success_message: &str, mutation: F) -> DeskResult<T>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let notifier = services.notifier();
    match run_mutation(notifier.as_ref(), success_message, mutation).await {
        Err(ApiError::Validation { message, fields }) => {
            eprintln!("{}", message);
            for (field, problems) in &fields {
                eprintln!("  {}: {}", field, problems.join(", "));
            }
            Err(ApiError::Validation { message, fields }.into())
        }
        other => Ok(other?),
    }
}

#[tokio::main]
async fn main() -> DeskResult<()> {
    let cli = Cli::parse();

    if let Commands::Config { action: ConfigCommand::Init { path } } = &cli.command {
        generate_sample_config(path)?;
        println!("Wrote sample configuration to {}", path);
        return Ok(());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(environment) = cli.env {
        config.environment = environment;
        validate(&config)?;
    }

    init_logging(&config.logging.filter, cli.verbose);

    let services = DeskServices::new(config, Arc::new(TracingNotifier))?;
    let _cleanup = services.spawn_cache_cleanup();

    run(cli.command, &services).await
}

async fn run(command: Commands, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match command {
        Commands::Login { token } => {
            api.login(&token)?;
            println!("Signed in");
            Ok(())
        }
        Commands::Logout => {
            api.logout();
            println!("Signed out");
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
        Commands::Casinos { action } => run_casinos(action, services).await,
        Commands::Profile { action } => run_profile(action, services).await,
        Commands::Fields { action } => run_fields(action, services).await,
        Commands::Contexts { action } => run_contexts(action, services).await,
        Commands::Settings { action } => run_settings(action, services).await,
        Commands::Bonuses { action } => run_bonuses(action, services).await,
        Commands::Payments { action } => run_payments(action, services).await,
        Commands::Promos { action } => run_promos(action, services).await,
        Commands::Accounts { action } => run_accounts(action, services).await,
        Commands::Emails { action } => run_emails(action, services).await,
        Commands::Comments { action } => run_comments(action, services).await,
        Commands::Tags { action } => run_tags(action, services).await,
        Commands::History { casino_id } => print_json(&api.list_history(casino_id).await?),
        Commands::Export {
            casino_id,
            out,
            no_images,
            geos,
        } => run_export(services, casino_id, out, no_images, geos).await,
    }
}

async fn run_casinos(action: CasinoCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        CasinoCommand::List => print_json(&api.list_casinos().await?),
        CasinoCommand::Show { id } => print_json(&api.get_casino(id).await?),
        CasinoCommand::Create(args) => {
            let casino = mutate(services, "Casino created", api.create_casino(&args.into())).await?;
            print_json(&casino)
        }
        CasinoCommand::Update { id, casino } => {
            let casino = mutate(services, "Casino updated", api.update_casino(id, &casino.into())).await?;
            print_json(&casino)
        }
        CasinoCommand::Delete { id } => mutate(services, "Casino deleted", api.delete_casino(id)).await,
    }
}

async fn run_profile(action: ProfileCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        ProfileCommand::Show { casino_id } => {
            let (fields, values) = tokio::try_join!(api.list_profile_fields(), api.get_profile_values(casino_id))?;
            let rows: Vec<_> = fields
                .iter()
                .map(|field| {
                    let value = values
                        .iter()
                        .find(|v| v.field_id == field.id)
                        .and_then(|v| v.value.clone());
                    serde_json::json!({ "field_id": field.id, "key": field.key, "label": field.label, "value": value })
                })
                .collect();
            print_json(&rows)
        }
        ProfileCommand::Set {
            casino_id,
            field_id,
            value,
        } => {
            let saved = mutate(
                services,
                "Profile updated",
                api.set_profile_value(casino_id, field_id, value.as_deref()),
            )
            .await?;
            print_json(&saved)
        }
    }
}

async fn run_fields(action: FieldCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        FieldCommand::List => print_json(&api.list_profile_fields().await?),
        FieldCommand::Create {
            key,
            label,
            field_type,
            order,
        } => {
            let field = NewProfileField {
                key,
                label,
                field_type,
                sort_order: order,
            };
            print_json(&mutate(services, "Field created", api.create_profile_field(&field)).await?)
        }
        FieldCommand::Delete { id } => mutate(services, "Field deleted", api.delete_profile_field(id)).await,
    }
}

async fn run_contexts(action: ContextCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        ContextCommand::List => print_json(&api.list_profile_contexts().await?),
        ContextCommand::Create { name, order } => {
            let context = NewProfileContext { name, sort_order: order };
            print_json(&mutate(services, "Context created", api.create_profile_context(&context)).await?)
        }
        ContextCommand::Delete { id } => mutate(services, "Context deleted", api.delete_profile_context(id)).await,
    }
}

async fn run_settings(action: SettingsCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        SettingsCommand::Show { casino_id, geo } => {
            let mut settings = api.get_profile_settings(casino_id).await?;
            if let Some(geo) = geo {
                settings.retain(|s| s.geo.eq_ignore_ascii_case(&geo));
            }
            print_json(&settings)
        }
        SettingsCommand::Set {
            casino_id,
            field,
            context,
            geo,
            enabled,
        } => {
            let change = SettingChange {
                field_id: field,
                context_id: context,
                geo,
                value: enabled,
            };
            mutate(services, "Settings saved", api.update_profile_settings(casino_id, &[change])).await
        }
    }
}

async fn run_bonuses(action: BonusCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        BonusCommand::List { casino_id } => print_json(&api.list_bonuses(casino_id).await?),
        BonusCommand::Create {
            casino_id,
            name,
            geo,
            kind,
            bonus_type,
            category,
            min_deposit,
            max_bonus,
            max_cashout,
            wager,
            currency,
            freespins,
            valid_days,
            promo_code,
            notes,
        } => {
            let bonus = NewBonus {
                name,
                geo,
                kind,
                bonus_type,
                category,
                min_deposit,
                max_bonus,
                max_cashout,
                wager,
                currency,
                freespins,
                valid_days,
                promo_code,
                notes,
            };
            print_json(&mutate(services, "Bonus created", api.create_bonus(casino_id, &bonus)).await?)
        }
        BonusCommand::Delete { id } => mutate(services, "Bonus deleted", api.delete_bonus(id)).await,
        BonusCommand::Images { bonus_id } => print_json(&api.list_bonus_images(bonus_id).await?),
    }
}

async fn run_payments(action: PaymentCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        PaymentCommand::List { casino_id } => print_json(&api.list_payments(casino_id).await?),
        PaymentCommand::Create {
            casino_id,
            geo,
            direction,
            method,
            min,
            max,
            currency,
            fee,
            processing_time,
            notes,
        } => {
            let payment = NewPayment {
                geo,
                direction,
                method,
                min_amount: min,
                max_amount: max,
                currency,
                fee,
                processing_time,
                notes,
            };
            print_json(&mutate(services, "Payment method created", api.create_payment(casino_id, &payment)).await?)
        }
        PaymentCommand::Delete { id } => mutate(services, "Payment method deleted", api.delete_payment(id)).await,
        PaymentCommand::Images { payment_id } => print_json(&api.list_payment_images(payment_id).await?),
    }
}

async fn run_promos(action: PromoCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        PromoCommand::List { casino_id } => print_json(&api.list_promos(casino_id).await?),
        PromoCommand::Create {
            casino_id,
            title,
            geo,
            promo_type,
            url,
            description,
        } => {
            let promo = NewPromo {
                title,
                geo,
                promo_type,
                url,
                description,
                ..Default::default()
            };
            print_json(&mutate(services, "Promotion created", api.create_promo(casino_id, &promo)).await?)
        }
        PromoCommand::Delete { id } => mutate(services, "Promotion deleted", api.delete_promo(id)).await,
    }
}

async fn run_accounts(action: AccountCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        AccountCommand::List { casino_id } => print_json(&api.list_accounts(casino_id).await?),
        AccountCommand::Create {
            casino_id,
            geo,
            login,
            password,
            email,
            phone,
            currency,
            notes,
        } => {
            let account = NewAccount {
                geo,
                login,
                password,
                email,
                phone,
                currency,
                notes,
                ..Default::default()
            };
            print_json(&mutate(services, "Account created", api.create_account(casino_id, &account)).await?)
        }
        AccountCommand::Delete { id } => mutate(services, "Account deleted", api.delete_account(id)).await,
        AccountCommand::Transactions { account_id } => print_json(&api.list_account_transactions(account_id).await?),
        AccountCommand::AddTransaction {
            account_id,
            direction,
            amount,
            currency,
            method,
        } => {
            let transaction = NewAccountTransaction {
                direction,
                amount,
                currency,
                method,
                status: None,
            };
            let saved = mutate(
                services,
                "Transaction recorded",
                api.create_account_transaction(account_id, &transaction),
            )
            .await?;
            print_json(&saved)
        }
    }
}

async fn run_emails(action: EmailCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        EmailCommand::List {
            casino,
            recipient,
            unread,
        } => {
            let filter = EmailFilter {
                casino_id: casino,
                recipient,
                unread: unread.then_some(true),
            };
            print_json(&api.list_emails(&filter).await?)
        }
        EmailCommand::Show { id } => print_json(&api.get_email(id).await?),
        EmailCommand::MarkRead { id, unread } => {
            let patch = EmailPatch {
                is_read: Some(!unread),
                ..Default::default()
            };
            print_json(&mutate(services, "Email updated", api.update_email(id, &patch)).await?)
        }
        EmailCommand::Link { id, casino_id } => {
            let patch = EmailPatch {
                casino_id: Some(casino_id),
                ..Default::default()
            };
            print_json(&mutate(services, "Email linked", api.update_email(id, &patch)).await?)
        }
        EmailCommand::Recipients => print_json(&api.list_email_recipients().await?),
    }
}

async fn run_comments(action: CommentCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        CommentCommand::List { casino_id } => print_json(&api.list_comments(casino_id).await?),
        CommentCommand::Add { casino_id, text, tags } => {
            let comment = NewComment {
                text_html: text,
                tag_ids: tags,
            };
            print_json(&mutate(services, "Comment added", api.create_comment(casino_id, &comment)).await?)
        }
        CommentCommand::Delete { id } => mutate(services, "Comment deleted", api.delete_comment(id)).await,
    }
}

async fn run_tags(action: TagCommand, services: &DeskServices) -> DeskResult<()> {
    let api = services.api();
    match action {
        TagCommand::List => print_json(&api.list_tags().await?),
        TagCommand::Create { name, color } => {
            let tag = NewTag { name, color };
            print_json(&mutate(services, "Tag created", api.create_tag(&tag)).await?)
        }
        TagCommand::Delete { id } => mutate(services, "Tag deleted", api.delete_tag(id)).await,
        TagCommand::Attach { comment_id, tag_id } => {
            mutate(services, "Tag attached", api.attach_tag(comment_id, tag_id)).await
        }
        TagCommand::Detach { comment_id, tag_id } => {
            mutate(services, "Tag removed", api.detach_tag(comment_id, tag_id)).await
        }
    }
}

async fn run_export(
    services: &DeskServices,
    casino_id: i64,
    out: Option<PathBuf>,
    no_images: bool,
    geos: Vec<String>,
) -> DeskResult<()> {
    let options = SnapshotOptions::with_geos(&geos);
    let snapshot = load_snapshot(services.api(), casino_id, &options).await?;

    let embedder = if no_images { None } else { services.image_embedder() };
    let document =
        export_profile_to_interactive_html(&snapshot, embedder.as_ref().map(|e| e as &dyn ImageEmbedder)).await?;

    let dir = out.unwrap_or_else(|| PathBuf::from(&services.config().export.output_dir));
    let path = document.save_to(&dir)?;
    info!("Exported {} to {}", snapshot.casino.name, path.display());
    println!("{}", path.display());
    Ok(())
}

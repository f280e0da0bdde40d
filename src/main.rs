use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use showroom::api::{ApiClient, ApiError, Credentials, VehicleApi};
use showroom::collection::{CollectionKind, VehicleCollection};
use showroom::config::{ClientConfig, ServerConfig, normalize_base_url};
use showroom::inventory::filter::Criteria;
use showroom::inventory::price::PriceTable;
use showroom::inventory::{ImageUpload, NewVehicle, VehicleUpdate};
use showroom::server::{self, ServerError};
use showroom::session::watcher::{check_expiry, spawn_expiry_watcher};
use showroom::session::{SessionEvent, SessionEvents, TokenStore, decode_claims, now_unix};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing admin token; run `showroom login` and set SHOWROOM_TOKEN or pass --token")]
    MissingToken,
    #[error("nothing to update; pass at least one field")]
    EmptyUpdate,
    #[error("could not read {path}: {source}")]
    ReadImage { path: String, source: std::io::Error },
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("server failed: {0}")]
    Server(#[from] ServerError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "showroom", about = "Dealership inventory client and reference service")]
struct Cli {
    /// Inventory service base URL. Defaults to `SHOWROOM_API_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "SHOWROOM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the in-memory inventory service.
    Serve {
        #[arg(long)]
        port: Option<u16>,
        /// Start with demo vehicles.
        #[arg(long)]
        seed: bool,
    },
    /// Fetch a collection and print the vehicles matching the filters.
    List(ListArgs),
    /// Add a vehicle with one or more images.
    Add(AddArgs),
    /// Edit fields of an existing vehicle.
    Update(UpdateArgs),
    Delete {
        id: String,
    },
    /// Exchange admin credentials for a token and print it.
    Login {
        #[arg(long, env = "ADMIN_EMAIL")]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Block until the token expires.
    Watch,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CollectionArg {
    All,
    Recent,
    Dashboard,
}

impl From<CollectionArg> for CollectionKind {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::All => Self::All,
            CollectionArg::Recent => Self::Recent,
            CollectionArg::Dashboard => Self::Dashboard,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TableArg {
    Catalog,
    Dashboard,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, value_enum, default_value = "all")]
    collection: CollectionArg,
    /// Price buckets to interpret `--price` against. Defaults to the collection's own.
    #[arg(long, value_enum)]
    table: Option<TableArg>,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "")]
    year: String,
    #[arg(long, default_value = "")]
    model: String,
    #[arg(long, default_value = "")]
    brand: String,
    /// Price bucket key, e.g. `25k-50k`.
    #[arg(long, default_value = "")]
    price: String,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    brand: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    year: i32,
    #[arg(long)]
    price: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    unavailable: bool,
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    available: Option<bool>,
}

struct CliContext {
    config: ClientConfig,
    token: Option<String>,
}

impl CliContext {
    fn client(&self, tokens: TokenStore) -> Result<ApiClient, CliError> {
        Ok(ApiClient::new(&self.config, tokens, SessionEvents::new())?)
    }

    fn anonymous(&self) -> Result<ApiClient, CliError> {
        self.client(TokenStore::new())
    }

    fn admin(&self) -> Result<ApiClient, CliError> {
        let token = self.token.clone().ok_or(CliError::MissingToken)?;
        self.client(TokenStore::with_token(token))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.base_url {
        config.base_url = normalize_base_url(url);
    }
    let ctx = CliContext { config, token: cli.token };

    match cli.command {
        Command::Serve { port, seed } => run_serve(port, seed).await,
        Command::List(args) => run_list(&ctx, args).await,
        Command::Add(args) => run_add(&ctx, args).await,
        Command::Update(args) => run_update(&ctx, args).await,
        Command::Delete { id } => {
            ctx.admin()?.delete_vehicle(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
        Command::Login { email, password } => {
            let login = ctx.anonymous()?.login(&Credentials { email, password }).await?;
            println!("{}", login.token);
            Ok(())
        }
        Command::Watch => run_watch(&ctx).await,
    }
}

async fn run_serve(port: Option<u16>, seed: bool) -> Result<(), CliError> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config.port = port;
    }
    config.seed_demo |= seed;
    server::serve(config).await?;
    Ok(())
}

async fn run_list(ctx: &CliContext, args: ListArgs) -> Result<(), CliError> {
    let kind = CollectionKind::from(args.collection);
    let table = match args.table {
        Some(TableArg::Catalog) => PriceTable::catalog(),
        Some(TableArg::Dashboard) => PriceTable::dashboard(),
        None => kind.price_table(),
    };
    let criteria = Criteria::default()
        .search(&args.search)
        .year(&args.year)
        .model(&args.model)
        .brand(&args.brand)
        .price(&args.price);

    let api = ctx.anonymous()?;
    let mut collection = VehicleCollection::new(kind);
    collection.refresh(&api).await?;
    let matches = collection.filtered(&criteria, &table);
    info!(%kind, fetched = collection.vehicles().len(), matched = matches.len(), "listed vehicles");
    print_json(&matches.iter().collect::<Vec<_>>())
}

async fn run_add(ctx: &CliContext, args: AddArgs) -> Result<(), CliError> {
    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        images.push(read_image(path).await?);
    }
    let form = NewVehicle {
        brand: args.brand,
        model: args.model,
        year: args.year,
        price: args.price,
        description: args.description,
        available: !args.unavailable,
        images,
    };

    let api = ctx.admin()?;
    let mut collection = VehicleCollection::new(CollectionKind::Dashboard);
    let created = collection.add(&api, form).await?;
    print_json(&created)
}

async fn read_image(path: &Path) -> Result<ImageUpload, CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::ReadImage {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
    Ok(ImageUpload::new(file_name, bytes))
}

async fn run_update(ctx: &CliContext, args: UpdateArgs) -> Result<(), CliError> {
    let update = VehicleUpdate {
        brand: args.brand,
        model: args.model,
        year: args.year,
        price: args.price,
        description: args.description,
        available: args.available,
    };
    if update.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    let updated = ctx.admin()?.update_vehicle(&args.id, &update).await?;
    print_json(&updated)
}

async fn run_watch(ctx: &CliContext) -> Result<(), CliError> {
    let token = ctx.token.clone().ok_or(CliError::MissingToken)?;
    if let Ok(claims) = decode_claims(&token) {
        info!(sub = ?claims.sub, exp = ?claims.exp, "watching token");
    }

    let store = TokenStore::with_token(token);
    let events = SessionEvents::new();
    let mut sub = events.subscribe();
    if check_expiry(&store, &events, now_unix()) {
        println!("session expired");
        return Ok(());
    }

    let watcher = spawn_expiry_watcher(store, events, ctx.config.token_poll);
    let event = sub.recv().await;
    watcher.abort();
    if let Some(SessionEvent::Expired { reason }) = event {
        println!("session expired ({reason:?})");
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use cds_api::{CdsClient, ContentDirectory, MediaServer};
use cds_didl::CdsObject;
use cds_navigator::{
    init_logging, init_logging_from_env, ContextState, DirectoryEvent, DirectoryEvents,
    LoggingMode, Navigator, NavigatorConfig,
};
use clap::{Parser, ValueEnum};
use soap_client::SoapClient;
use tracing::{debug, info, warn};

pub mod output;

use output::{listing_json, listing_line, object_json};

/// Logging mode selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    Silent,
    Development,
    Debug,
}

impl From<LogMode> for LoggingMode {
    fn from(mode: LogMode) -> Self {
        match mode {
            LogMode::Silent => LoggingMode::Silent,
            LogMode::Development => LoggingMode::Development,
            LogMode::Debug => LoggingMode::Debug,
        }
    }
}

/// Browse a UPnP ContentDirectory server
///
/// Lists a container (the server root by default), optionally walking a path
/// of container titles first. Can also print object metadata, dump the raw
/// tag index of each object, and destroy objects on servers that allow it.
#[derive(Parser, Debug)]
#[command(name = "cds-cli")]
#[command(about = "Browse a UPnP ContentDirectory server")]
#[command(version)]
pub struct Args {
    /// Control URL of the ContentDirectory service
    pub control_url: String,

    /// Object id to start from
    #[arg(default_value = "0")]
    pub object_id: String,

    /// Identifier used to tell servers apart
    #[arg(long, default_value = "cds-cli")]
    pub server_id: String,

    /// Print the metadata of OBJECT_ID instead of listing it
    #[arg(short, long)]
    pub metadata: bool,

    /// Container titles to enter after OBJECT_ID, separated by '/'
    #[arg(short, long)]
    pub path: Option<String>,

    /// Print the full tag index of every object
    #[arg(long)]
    pub dump: bool,

    /// Destroy this object, which must be listed in the final container
    #[arg(long, value_name = "ID")]
    pub delete: Option<String>,

    /// Print the system update id and the sort/search capabilities
    #[arg(long)]
    pub capabilities: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Objects requested per Browse call
    #[arg(long, default_value = "10")]
    pub page_size: u32,

    /// Browse filter
    #[arg(long, default_value = "*")]
    pub filter: String,

    /// Browse sort criteria
    #[arg(long, default_value = "")]
    pub sort: String,

    /// Seconds to wait for one listing
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// HTTP read timeout in seconds
    #[arg(long, default_value = "10")]
    pub read_timeout: u64,

    /// Logging mode; CDS_LOG_MODE is used when absent
    #[arg(long, value_enum)]
    pub log_mode: Option<LogMode>,
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if !(self.control_url.starts_with("http://") || self.control_url.starts_with("https://")) {
            return Err(anyhow!(
                "Control URL must be an http(s) URL, got '{}'",
                self.control_url
            ));
        }

        if self.object_id.trim().is_empty() {
            return Err(anyhow!("Object id must not be empty"));
        }

        if self.timeout == 0 || self.read_timeout == 0 {
            return Err(anyhow!("Timeouts must be positive"));
        }

        if self.metadata && (self.path.is_some() || self.delete.is_some()) {
            return Err(anyhow!("--metadata cannot be combined with --path or --delete"));
        }

        if self.json && self.dump {
            return Err(anyhow!("--json and --dump are mutually exclusive"));
        }

        Ok(())
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig::new()
            .with_root_object_id(self.object_id.clone())
            .with_filter(self.filter.clone())
            .with_sort_criteria(self.sort.clone())
            .with_page_size(self.page_size)
    }

    /// Titles to walk, empty segments dropped
    pub fn path_segments(&self) -> Vec<&str> {
        self.path
            .as_deref()
            .map(|path| path.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

fn media_server(args: &Args) -> MediaServer {
    let soap_client = SoapClient::with_timeouts(
        Duration::from_secs(5),
        Duration::from_secs(args.read_timeout),
    );

    MediaServer::new(args.server_id.clone(), args.control_url.clone())
        .with_destroy_support(args.delete.is_some())
        .with_client(CdsClient::with_soap_client(soap_client))
}

fn print_capabilities(server: &MediaServer) -> Result<()> {
    let update_id = server
        .system_update_id()
        .context("GetSystemUpdateID failed")?;
    let sort = server
        .sort_capabilities()
        .context("GetSortCapabilities failed")?;
    let search = server
        .search_capabilities()
        .context("GetSearchCapabilities failed")?;

    println!("System update id: {}", update_id);
    println!("Sort capabilities: {}", sort.join(", "));
    println!("Search capabilities: {}", search.join(", "));
    println!();
    Ok(())
}

fn print_objects(args: &Args, objects: &[Arc<CdsObject>]) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing_json(objects))?);
    } else if args.dump {
        for object in objects {
            println!("{}", object.dump());
        }
    } else {
        for object in objects {
            println!("{}", listing_line(object));
        }
    }
    Ok(())
}

/// Apply worker results until the navigator is idle, then surface any failure
fn settle(navigator: &mut Navigator, events: &DirectoryEvents, timeout: Duration) -> Result<()> {
    if !navigator.wait_idle(timeout) {
        bail!("No answer within {}s", timeout.as_secs());
    }

    for event in events.try_iter() {
        debug!(?event, "directory event");
        match event {
            DirectoryEvent::Failed { parent_id, reason } => {
                bail!("Listing of '{}' failed: {}", parent_id, reason)
            }
            DirectoryEvent::DeleteFailed { object_id, reason } => {
                bail!("Deleting '{}' failed: {}", object_id, reason)
            }
            DirectoryEvent::Deleted { object_id } => info!(object_id = %object_id, "object deleted"),
            _ => {}
        }
    }

    if navigator.current().state() == ContextState::Failed {
        bail!("Listing of '{}' failed", navigator.current().parent_id());
    }
    Ok(())
}

fn walk_path(navigator: &mut Navigator, events: &DirectoryEvents, args: &Args) -> Result<()> {
    for segment in args.path_segments() {
        let child = navigator
            .current()
            .entities()
            .iter()
            .find(|e| e.is_container() && e.title() == segment)
            .cloned()
            .ok_or_else(|| anyhow!("No container titled '{}' in '{}'", segment, navigator.current().parent_id()))?;

        if !navigator.open(&child) {
            bail!("Cannot enter '{}'", segment);
        }
        settle(navigator, events, args.listing_timeout())
            .with_context(|| format!("Failed while entering '{}'", segment))?;
    }
    Ok(())
}

fn delete_object(navigator: &mut Navigator, events: &DirectoryEvents, args: &Args, object_id: &str) -> Result<()> {
    let target = navigator
        .current()
        .member(&CdsObject::root(args.server_id.clone(), object_id))
        .cloned()
        .ok_or_else(|| anyhow!("'{}' is not listed here", object_id))?;

    if !navigator.delete(&target) {
        bail!(
            "Server refuses to destroy '{}' (restricted object or container)",
            object_id
        );
    }
    settle(navigator, events, args.listing_timeout())
}

fn run(args: Args) -> Result<()> {
    let server = media_server(&args);
    if args.capabilities {
        print_capabilities(&server)?;
    }

    let directory: Arc<dyn ContentDirectory> = Arc::new(server);
    let mut navigator =
        Navigator::new(directory, args.navigator_config()).context("Invalid browse settings")?;

    if args.metadata {
        let object = navigator
            .metadata(&args.object_id)
            .with_context(|| format!("Failed to fetch metadata of '{}'", args.object_id))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&object_json(&object))?);
        } else {
            println!("{}", object.dump());
        }
        return Ok(());
    }

    let events = navigator.subscribe();
    navigator.reload();
    settle(&mut navigator, &events, args.listing_timeout())
        .with_context(|| format!("Failed to list '{}'", args.object_id))?;

    walk_path(&mut navigator, &events, &args)?;

    if let Some(object_id) = args.delete.as_deref() {
        delete_object(&mut navigator, &events, &args, object_id)?;
    }

    let current = navigator.current();
    if !args.json {
        let location = match navigator.path_string() {
            path if path.is_empty() => current.parent_id().to_string(),
            path => path,
        };
        println!("{} ({} objects)", location, current.entities().len());
    }
    print_objects(&args, current.entities())?;

    navigator.terminate();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    match args.log_mode {
        Some(mode) => init_logging(mode.into()),
        None => init_logging_from_env(),
    }
    .context("Failed to initialize logging")?;

    if let Err(e) = run(args) {
        warn!("cds-cli failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

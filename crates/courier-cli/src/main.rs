//! courier: submit computation tasks to a worker node.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value, json};

use courier_core::codec::parse_params;
use courier_core::domain::TaskTypeRegistry;
use courier_core::impls::{StubWorker, accept_all};
use courier_core::ports::{SystemClock, UlidGenerator};
use courier_core::{ClientConfig, SubmitClient, TaskBuilder, TaskDescriptor};

#[derive(Parser)]
#[command(name = "courier", version, about = "Task submission client")]
struct Cli {
    /// Worker address, overrides the configured node.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Client id used for sequence numbering.
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Worker the submission is intended for.
    #[arg(long, global = true)]
    worker_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit one task described on the command line.
    Submit(SubmitArgs),
    /// Submit a canned keyword PIR or PSI task.
    Demo {
        #[arg(value_enum)]
        kind: DemoKind,
    },
    /// Run a stub worker that accepts every submission.
    Worker {
        #[arg(long, default_value = "127.0.0.1:50050")]
        listen: String,
    },
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long)]
    task_type: i32,

    /// Parameters as `name:TYPE:is_array:value`, comma separated.
    #[arg(long, default_value = "")]
    params: String,

    /// Input dataset names, comma separated.
    #[arg(long, default_value = "")]
    input_datasets: String,

    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value_t = 0)]
    language: i32,

    #[arg(long)]
    job_id: Option<String>,

    #[arg(long)]
    task_id: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoKind {
    Pir,
    Psi,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Submit(args) => {
            let client = client(&cli)?;
            let task = submit_task(args)?;
            submit(&client, task).await
        }
        Command::Demo { kind } => {
            let client = client(&cli)?;
            let task = demo_task(*kind)?;
            submit(&client, task).await
        }
        Command::Worker { listen } => run_worker(listen).await,
    }
}

fn client(cli: &Cli) -> Result<SubmitClient> {
    let mut config = ClientConfig::load().context("failed to load client config")?;
    if let Some(server) = &cli.server {
        config.node = server.clone();
    }
    if let Some(client_id) = &cli.client_id {
        config.client_id = Some(client_id.clone());
    }
    if let Some(worker_id) = &cli.worker_id {
        config.intended_worker_id = worker_id.clone();
    }
    tracing::debug!(node = %config.node, "client configured");
    Ok(SubmitClient::from_config(&config))
}

fn submit_task(args: &SubmitArgs) -> Result<TaskDescriptor> {
    let params = parse_params(&args.params).context("invalid --params")?;
    let datasets = args
        .input_datasets
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut builder = TaskBuilder::new(args.task_type, args.name.as_str())
        .language(args.language)
        .params(params)
        .input_datasets(datasets);
    if let Some(job_id) = &args.job_id {
        builder = builder.job_id(job_id.as_str());
    }
    if let Some(task_id) = &args.task_id {
        builder = builder.task_id(task_id.as_str());
    }

    let ids = UlidGenerator::new(SystemClock);
    Ok(builder.build(&TaskTypeRegistry::builtin(), &ids)?)
}

fn demo_task(kind: DemoKind) -> Result<TaskDescriptor> {
    let (task_type, name, params, datasets) = match kind {
        DemoKind::Pir => (
            2,
            "keyword pir task",
            json!({
                "clientData": "lLAnqwEihmGXxVPZZESncfgaaIZIhoPpMEmHPSFUoqUgUHBnMUddmTVwHfxEsqGg",
                "serverData": "keyword_pir_server_data",
                "pirType": 1,
                "outputFullFilename": "/data/result/cli/kw_pir_result.csv",
            }),
            vec!["serverData"],
        ),
        DemoKind::Psi => (
            3,
            "psi task",
            json!({
                "clientData": "psi_client_data",
                "serverData": "psi_server_data",
                "clientIndex": 0,
                "serverIndex": 1,
                "psiType": 0,
                "psiTag": 0,
                "outputFullFilename": "/data/result/cli/psi_result.csv",
            }),
            vec!["clientData", "serverData"],
        ),
    };

    let registry = TaskTypeRegistry::builtin();
    let resolved = registry.resolve(task_type)?;
    let Some(schema) = registry.schema_for(resolved) else {
        bail!("no parameter schema registered for task type {task_type}");
    };
    let params: Map<String, Value> = params.as_object().cloned().unwrap_or_default();
    let params = schema.encode(params.iter())?;

    let ids = UlidGenerator::new(SystemClock);
    Ok(TaskBuilder::new(task_type, name)
        .language(3)
        .params(params)
        .input_datasets(datasets)
        .build(&registry, &ids)?)
}

async fn submit(client: &SubmitClient, task: TaskDescriptor) -> Result<()> {
    let address = client.endpoint().address.clone();
    let reply = client
        .submit_task(task)
        .await
        .with_context(|| format!("submission to {address} failed"))?;

    println!("return code: {}", reply.ret_code);
    println!("job id: {}", reply.job_id);

    if !reply.ret_code.is_success() {
        bail!("worker rejected the submission with {}", reply.ret_code);
    }
    Ok(())
}

async fn run_worker(listen: &str) -> Result<()> {
    let worker = StubWorker::bind(listen, accept_all())
        .await
        .with_context(|| format!("failed to bind stub worker on {listen}"))?;
    tracing::info!(addr = %worker.local_addr()?, "stub worker listening");

    tokio::select! {
        served = worker.serve() => served.context("stub worker stopped")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}

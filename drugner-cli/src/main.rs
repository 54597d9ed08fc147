//! CLI que gera a tabela de features do crfsuite a partir de um diretório do corpus DDI

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use drugner_core::corpus::list_documents;
use drugner_core::{write_record, Config, FeaturePipeline, OutputFormat};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Converte sentenças anotadas em features por token para treino de CRF
#[derive(Debug, Parser)]
#[command(name = "drugner", version, about)]
struct Args {
    /// Diretório com os arquivos XML do corpus
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Arquivo de saída (padrão: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Formato de saída
    #[arg(short, long, value_enum, default_value = "crfsuite")]
    format: FormatArg,

    /// Arquivo de configuração TOML
    #[arg(short, long, value_name = "FILE", env = "DRUGNER_CONFIG")]
    config: Option<PathBuf>,

    /// Spans fora do texto da sentença invalidam o documento
    #[arg(long)]
    strict: bool,

    /// Processa documentos em paralelo
    #[arg(short, long)]
    parallel: bool,

    /// Registra documentos inválidos e continua com os demais
    #[arg(short, long)]
    keep_going: bool,

    /// Aumenta o nível de log (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Só registra erros
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Tabela separada por TAB para o crfsuite
    Crfsuite,
    /// Um objeto JSON por token
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Crfsuite => OutputFormat::Crfsuite,
            FormatArg::Jsonl => OutputFormat::Jsonl,
        }
    }
}

impl Args {
    /// Configuração do arquivo (se houver) com as flags da linha de comando por cima.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        config.aligner.strict |= self.strict;
        config.pipeline.parallel |= self.parallel;
        config.pipeline.keep_going |= self.keep_going;
        Ok(config)
    }

    fn log_filter(&self) -> EnvFilter {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout é reservado para a tabela de features
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(io::stderr)
        .init();

    let config = args.load_config()?;
    let pipeline = FeaturePipeline::from_config(&config).context("failed to build pipeline")?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);

    let paths = list_documents(&args.input_dir)
        .with_context(|| format!("failed to read corpus directory {}", args.input_dir.display()))?;
    info!(dir = %args.input_dir.display(), documents = paths.len(), "processing corpus directory");

    let format = OutputFormat::from(args.format);
    let keep_going = config.pipeline.keep_going;
    let mut written = 0usize;
    let mut failed = 0usize;

    // Cada documento é escrito assim que fica pronto
    let result = pipeline.process_files_with(&paths, |outcome| -> Result<()> {
        match outcome.records {
            Ok(records) => {
                for record in &records {
                    write_record(&mut out, record, format).context("failed to write output")?;
                }
                written += records.len();
                Ok(())
            }
            Err(err) if keep_going => {
                error!(path = %outcome.path.display(), error = %err, "skipping invalid document");
                failed += 1;
                Ok(())
            }
            Err(err) => Err::<(), _>(err)
                .with_context(|| format!("failed to process {}", outcome.path.display())),
        }
    });
    out.flush().context("failed to write output")?;
    result?;

    info!(sentences = written, failed_documents = failed, "done");
    if failed > 0 && written == 0 {
        bail!("no document could be processed ({failed} failed)");
    }
    Ok(())
}

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use etherscanner::{EtherScanner, ScannerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: {} <BLOCO | TX_HASH>  (endpoint em ETHERSCANNER_RPC_URL)", args[0]);
        std::process::exit(1);
    }

    let config = ScannerConfig::from_env().context("configuracao invalida")?;
    let scanner = EtherScanner::connect(config)
        .await
        .context("falha ao conectar ao node")?;

    let start = Instant::now();
    let output = if args[1].starts_with("0x") {
        let report = match scanner.process_transaction(&args[1]).await {
            Ok(report) => report,
            Err(e) if e.is_transaction_error() => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
            Err(e) => return Err(e).context("falha ao processar transacao"),
        };
        info!("Transacao com {} transferencias", report.transfers.len());
        serde_json::to_string_pretty(&report)?
    } else {
        let number: u64 = args[1].parse().context("numero de bloco invalido")?;
        let scan = scanner.scan_block(number).await.context("falha ao varrer bloco")?;
        info!(
            "Bloco {} com {} transacoes ({} falharam)",
            scan.number,
            scan.transactions.len(),
            scan.failed.len()
        );
        serde_json::to_string_pretty(&scan)?
    };

    println!("{}", output);
    let elapsed = start.elapsed();
    println!(
        "Tempo total: {}.{:03} segundos",
        elapsed.as_secs(),
        elapsed.subsec_millis()
    );

    Ok(())
}

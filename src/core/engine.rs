use crate::config::cli::LocalStorage;
use crate::core::batch::BatchDriver;
use crate::core::qr::HttpQrFetcher;
use crate::core::signature::FontRenderer;
use crate::core::table::RecordTable;
use crate::domain::model::BatchReport;
use crate::domain::ports::{ConfigProvider, QrSource, SignatureRenderer, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::Path;

pub struct CertificateEngine<S: Storage, R: SignatureRenderer, Q: QrSource> {
    driver: BatchDriver<S, R, Q>,
    monitor: SystemMonitor,
}

impl CertificateEngine<LocalStorage, FontRenderer, HttpQrFetcher> {
    /// 依設定建立正式元件；字型在此載入，失敗時尚未產生任何輸出
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let renderer = FontRenderer::from_file(config.font_path(), config.font_size())?;
        let qr_source = HttpQrFetcher::new(config.qr_endpoint(), config.timeout_secs())?;
        let storage = LocalStorage::new(config.output_folder().to_string());

        let driver = BatchDriver::new(storage, renderer, qr_source).with_policy(config.on_error());
        Ok(Self::new(driver))
    }
}

impl<S: Storage, R: SignatureRenderer, Q: QrSource> CertificateEngine<S, R, Q> {
    pub fn new(driver: BatchDriver<S, R, Q>) -> Self {
        Self {
            driver,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_monitoring(mut self, enable_monitoring: bool) -> Self {
        self.monitor = SystemMonitor::new(enable_monitoring);
        self
    }

    pub async fn run<P: AsRef<Path>>(&self, input_file: P) -> Result<BatchReport> {
        let input_file = input_file.as_ref();
        tracing::info!("📥 Loading records from {}", input_file.display());
        self.monitor.log_stats("Start");

        let table = RecordTable::load(input_file)?;
        tracing::info!("Loaded {} record(s)", table.len());
        self.monitor.log_stats("Table loaded");

        let report = self.driver.run(&table).await?;
        self.monitor.log_stats("Batch complete");

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        Ok(report)
    }
}

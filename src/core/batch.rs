use crate::core::compose::{compose, encode_png};
use crate::core::sanitize::output_filename;
use crate::core::table::RecordTable;
use crate::domain::model::{
    BatchReport, CertificateRecord, FilenameCollision, RecordErrorPolicy, SkippedRecord,
    WrittenCertificate,
};
use crate::domain::ports::{QrSource, SignatureRenderer, Storage};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

pub fn progress_line(position: usize, total: usize, name: &str) -> String {
    format!("[{}/{}]: {}", position, total, name)
}

/// 逐筆處理記錄：簽名 + QR code → 合成 → PNG 寫入輸出資料夾
pub struct BatchDriver<S: Storage, R: SignatureRenderer, Q: QrSource> {
    storage: S,
    renderer: R,
    qr_source: Q,
    policy: RecordErrorPolicy,
    progress: Mutex<Box<dyn Write + Send>>,
}

impl<S: Storage, R: SignatureRenderer, Q: QrSource> BatchDriver<S, R, Q> {
    pub fn new(storage: S, renderer: R, qr_source: Q) -> Self {
        Self {
            storage,
            renderer,
            qr_source,
            policy: RecordErrorPolicy::default(),
            progress: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    /// Progress lines go to stdout unless redirected here.
    pub fn with_progress<W: Write + Send + 'static>(mut self, sink: W) -> Self {
        self.progress = Mutex::new(Box::new(sink));
        self
    }

    pub fn with_policy(mut self, policy: RecordErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, table: &RecordTable) -> Result<BatchReport> {
        self.storage.ensure_root().await?;

        let total = table.len();
        let mut report = BatchReport::new(total);
        // 完整檔名 → 第一次寫入的列；小寫檔名用來偵測大小寫不敏感檔案系統上的覆寫
        let mut exact: HashMap<String, usize> = HashMap::new();
        let mut folded: HashMap<String, usize> = HashMap::new();

        tracing::info!("🚀 Generating {} certificate image(s)", total);

        for (index, record) in table.records().enumerate() {
            let position = index + 1;
            let outcome = match record {
                Ok(record) => self.process(&record).await.map(|file| (record, file)),
                Err(e) => Err(e),
            };

            match outcome {
                Ok((record, file)) => {
                    // 同名檔案直接覆寫，只回報不去重
                    let lowered = file.to_lowercase();
                    if let Some(&first_position) = exact.get(&file) {
                        tracing::warn!(
                            "⚠️ Row {} overwrote '{}' first written by row {}",
                            position,
                            file,
                            first_position
                        );
                        report.collisions.push(FilenameCollision {
                            file: file.clone(),
                            first_position,
                            overwritten_by: position,
                            case_only: false,
                        });
                    } else if let Some(&first_position) = folded.get(&lowered) {
                        tracing::warn!(
                            "⚠️ Row {} wrote '{}', which differs only in case from row {}; \
                             case-insensitive filesystems keep a single file",
                            position,
                            file,
                            first_position
                        );
                        report.collisions.push(FilenameCollision {
                            file: file.clone(),
                            first_position,
                            overwritten_by: position,
                            case_only: true,
                        });
                    }
                    exact.entry(file.clone()).or_insert(position);
                    folded.entry(lowered).or_insert(position);

                    self.report_progress(position, total, &record.name)?;
                    report.written.push(WrittenCertificate {
                        position,
                        name: record.name,
                        file,
                    });
                }
                Err(e) if e.is_record_level() && self.policy == RecordErrorPolicy::Skip => {
                    tracing::warn!("⏭️ Skipping row {}/{}: {}", position, total, e);
                    report.skipped.push(SkippedRecord {
                        position,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!("❌ Row {}/{} failed, aborting batch: {}", position, total, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "✅ Wrote {} image(s), skipped {}, {} filename collision(s)",
            report.written.len(),
            report.skipped.len(),
            report.collisions.len()
        );

        Ok(report)
    }

    fn report_progress(&self, position: usize, total: usize, name: &str) -> Result<()> {
        let mut sink = self.progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(sink, "{}", progress_line(position, total, name))?;
        sink.flush()?;
        Ok(())
    }

    async fn process(&self, record: &CertificateRecord) -> Result<String> {
        tracing::debug!("Processing row {}: {}", record.position, record.id_certificate);

        let signature = self.renderer.render(&record.name);
        let qr = self.qr_source.fetch(&record.id_certificate).await?.to_rgb8();
        let composite = compose(&signature, &qr)?;
        let png = encode_png(&composite)?;

        let file = output_filename(&record.name, &record.department);
        self.storage.write_file(&file, &png).await?;
        Ok(file)
    }
}

//! Subcommand implementations.
//!
//! Each command writes its report to any `io::Write` so it can be checked
//! in tests; the public wrappers target stdout.

use std::hash::Hasher;
use std::io::{self, Write};
use std::path::Path;

use twox_hash::XxHash64;

use dataset_core::config::CompareConfig;
use dataset_core::dataset::compare::compare_buffers_with_limit;
use dataset_core::{BatchBuffers, DatasetError, DatasetReader, Result, Tolerance};

pub fn info(folder: &Path, max_batches: Option<usize>) -> Result<()> {
    write_info(&mut io::stdout().lock(), folder, max_batches)
}

pub fn checksum(folder: &Path, max_batches: Option<usize>, num_datas: Option<usize>) -> Result<()> {
    write_checksums(&mut io::stdout().lock(), folder, max_batches, num_datas)
}

/// Returns `Ok(false)` when any tensor of any batch mismatched.
pub fn compare(
    golden: &Path,
    result: &Path,
    config: &CompareConfig,
    max_batches: Option<usize>,
) -> Result<bool> {
    write_comparison(&mut io::stdout().lock(), golden, result, config, max_batches)
}

fn output_error(e: io::Error) -> DatasetError {
    DatasetError::storage_with_source("<stdout>", "failed to write output", e)
}

fn write_info(out: &mut impl Write, folder: &Path, max_batches: Option<usize>) -> Result<()> {
    let reader = DatasetReader::open(folder, max_batches)?;
    let manifest = reader.tensor_info();

    writeln!(out, "folder:  {}", reader.folder().display()).map_err(output_error)?;
    writeln!(out, "tensors: {}", manifest.len()).map_err(output_error)?;
    for spec in manifest {
        writeln!(out, "  {:<32} {:>12} bytes", spec.name, spec.byte_size).map_err(output_error)?;
    }
    writeln!(out, "batch bytes: {}", manifest.total_batch_bytes()).map_err(output_error)?;
    writeln!(out, "batches: {}", reader.max_size()).map_err(output_error)?;
    Ok(())
}

fn xxhash64(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

fn write_checksums(
    out: &mut impl Write,
    folder: &Path,
    max_batches: Option<usize>,
    num_datas: Option<usize>,
) -> Result<()> {
    let mut reader = DatasetReader::open(folder, max_batches)?;
    let mut buffers = BatchBuffers::for_manifest(reader.tensor_info());
    let count = num_datas.map_or(buffers.len(), |n| n.min(buffers.len()));

    while !reader.is_exhausted() {
        let index = reader.cursor();
        reader.try_read_next(&mut buffers.as_mut_slices(), num_datas)?;

        for (spec, data) in reader.tensor_info().iter().zip(buffers.iter()).take(count) {
            writeln!(out, "{index}\t{}\t{:016x}", spec.name, xxhash64(data)).map_err(output_error)?;
        }
    }

    tracing::info!("Checksummed {} batches from {}", reader.max_size(), folder.display());
    Ok(())
}

fn write_comparison(
    out: &mut impl Write,
    golden: &Path,
    result: &Path,
    config: &CompareConfig,
    max_batches: Option<usize>,
) -> Result<bool> {
    let mut golden_reader = DatasetReader::open(golden, max_batches)?;
    let mut result_reader = DatasetReader::open(result, max_batches)?;

    if golden_reader.tensor_info() != result_reader.tensor_info() {
        return Err(DatasetError::comparison(format!(
            "manifests of {} and {} differ",
            golden.display(),
            result.display()
        )));
    }
    if golden_reader.max_size() != result_reader.max_size() {
        tracing::warn!(
            "Batch counts differ (golden {}, result {}); comparing the common prefix",
            golden_reader.max_size(),
            result_reader.max_size()
        );
    }

    let tolerance = Tolerance::new(config.atol, config.rtol);
    let mut all_passed = true;
    let mut batches = 0;

    while let (Some(g), Some(r)) = (golden_reader.next_batch()?, result_reader.next_batch()?) {
        for (spec, (g_data, r_data)) in golden_reader
            .tensor_info()
            .iter()
            .zip(g.buffers.iter().zip(r.buffers.iter()))
        {
            let report = compare_buffers_with_limit(
                g_data,
                r_data,
                config.dtype,
                tolerance,
                config.max_report,
            )?;
            let status = if report.passed() { "ok" } else { "MISMATCH" };
            writeln!(out, "batch {} {}: {} ({})", g.index, spec.name, status, report)
                .map_err(output_error)?;

            if !report.passed() {
                all_passed = false;
                for m in &report.first_mismatches {
                    writeln!(
                        out,
                        "    [{}] golden={} result={}",
                        m.index, m.golden, m.result
                    )
                    .map_err(output_error)?;
                }
            }
        }
        batches += 1;
    }

    writeln!(
        out,
        "{} batches compared: {}",
        batches,
        if all_passed { "PASS" } else { "FAIL" }
    )
    .map_err(output_error)?;
    Ok(all_passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset_core::{DatasetWriter, ElementType, TensorManifest, TensorSpec};
    use tempfile::TempDir;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    fn write_dataset(folder: &Path, batches: &[[f32; 2]]) {
        let manifest = TensorManifest::new(vec![
            TensorSpec::new("logits", 8),
            TensorSpec::new("ids", 8),
        ]);
        let mut writer = DatasetWriter::create(folder, manifest).unwrap();
        for (i, values) in batches.iter().enumerate() {
            let logits = f32_bytes(values);
            let ids = f32_bytes(&[i as f32, i as f32 + 1.0]);
            writer.write_batch(&[&logits, &ids]).unwrap();
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_info_lists_tensors() {
        let temp = TempDir::new().unwrap();
        write_dataset(temp.path(), &[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);

        let text = render(|out| write_info(out, temp.path(), None));
        assert!(text.contains("tensors: 2"));
        assert!(text.contains("logits"));
        assert!(text.contains("batch bytes: 16"));
        assert!(text.contains("batches: 3"));

        let capped = render(|out| write_info(out, temp.path(), Some(1)));
        assert!(capped.contains("batches: 1"));
    }

    #[test]
    fn test_checksums_are_stable() {
        let temp = TempDir::new().unwrap();
        write_dataset(temp.path(), &[[1.0, 2.0], [3.0, 4.0]]);

        let first = render(|out| write_checksums(out, temp.path(), None, None));
        let second = render(|out| write_checksums(out, temp.path(), None, None));
        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 4);

        let expected = format!("0\tids\t{:016x}", xxhash64(&f32_bytes(&[0.0, 1.0])));
        assert!(first.lines().any(|l| l == expected));
    }

    #[test]
    fn test_checksums_respect_num_datas() {
        let temp = TempDir::new().unwrap();
        write_dataset(temp.path(), &[[1.0, 2.0], [3.0, 4.0]]);

        let text = render(|out| write_checksums(out, temp.path(), None, Some(1)));
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.contains("logits")));
    }

    #[test]
    fn test_compare_pass_and_fail() {
        let golden = TempDir::new().unwrap();
        let close = TempDir::new().unwrap();
        let far = TempDir::new().unwrap();
        write_dataset(golden.path(), &[[1.0, 2.0], [3.0, 4.0]]);
        write_dataset(close.path(), &[[1.0, 2.000001], [3.0, 4.0]]);
        write_dataset(far.path(), &[[1.0, 2.0], [3.5, 4.0]]);

        let config = CompareConfig {
            dtype: ElementType::F32,
            atol: 1e-4,
            rtol: 0.0,
            max_report: 5,
        };

        let mut out = Vec::new();
        assert!(write_comparison(&mut out, golden.path(), close.path(), &config, None).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("2 batches compared: PASS"));

        let mut out = Vec::new();
        assert!(!write_comparison(&mut out, golden.path(), far.path(), &config, None).unwrap());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("batch 1 logits: MISMATCH"));
        assert!(text.contains("[0] golden=3 result=3.5"));
        assert!(text.contains("FAIL"));
    }

    #[test]
    fn test_compare_rejects_different_manifests() {
        let golden = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        write_dataset(golden.path(), &[[1.0, 2.0]]);
        DatasetWriter::create(
            other.path(),
            TensorManifest::new(vec![TensorSpec::new("logits", 8)]),
        )
        .unwrap();

        let mut out = Vec::new();
        let err = write_comparison(
            &mut out,
            golden.path(),
            other.path(),
            &CompareConfig::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::Comparison { .. }));
    }
}

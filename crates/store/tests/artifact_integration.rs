use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use vigil_core::chart::entity::{ChartImage, ImageFormat};
use vigil_core::common::{Entity, Period};
use vigil_core::score::entity::{Aggregate, ScoredSeries, ScoringMode};
use vigil_core::store::port::ArtifactStore;
use vigil_core::testing::daily_rows;
use vigil_engine::evaluate;
use vigil_store::artifact::{FsArtifactStore, TABLE_HEADER};

fn sample_series() -> ScoredSeries {
    let rows = daily_rows(
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        &[100.0, 102.0, 99.0, 101.0, 101.0],
        5000.0,
    );
    evaluate(Entity::new("MSFT", "Microsoft"), &rows, ScoringMode::Continuous).unwrap()
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
}

/// # Summary
/// 指标表落盘后的完整结构校验。
///
/// # Logic
/// 1. 写入五行序列。
/// 2. 读回 CSV：表头、五个观测行、一个聚合行。
/// 3. 缺失值为空单元格，聚合行只有 trust_score 有值。
#[tokio::test]
async fn test_table_layout() -> anyhow::Result<()> {
    let tmp_dir = tempdir()?;
    let store = FsArtifactStore::new(tmp_dir.path().join("output"))?;
    let series = sample_series();

    let path = store.save_table(&series, run_date()).await?;
    assert_eq!(path.file_name().unwrap(), "MSFT_stock_2024-02-01.csv");

    let mut reader = csv::Reader::from_path(&path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    assert_eq!(headers, TABLE_HEADER);

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(records.len(), 6);

    // 第 0 行：涨跌幅与滚动统计均缺失
    assert_eq!(&records[0][6], "");
    assert_eq!(&records[0][7], "");
    assert_eq!(&records[0][12], "");
    assert_eq!(&records[0][13], "10");
    // 第 1 行：涨跌幅 2
    assert_eq!(&records[1][6], "2");
    // 第 2 行：窗口已满
    assert_eq!(&records[2][8], "1.53");
    assert_eq!(&records[2][11], "true");
    assert_eq!(&records[2][12], "1");

    let aggregate = &records[5];
    assert_eq!(&aggregate[0], "Aggregated");
    assert!(aggregate.iter().skip(1).take(12).all(|cell| cell.is_empty()));
    let score: f64 = aggregate[13].parse()?;
    assert!((score - series.aggregate.score.unwrap()).abs() < 1e-9);
    Ok(())
}

/// 行情源返回的浮点噪声不应出现在落盘的价格列中。
#[tokio::test]
async fn test_table_prices_are_two_decimals() -> anyhow::Result<()> {
    let tmp_dir = tempdir()?;
    let store = FsArtifactStore::new(tmp_dir.path())?;
    let mut rows = daily_rows(
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        &[370.869_995_117_187_5, 370.604_003_906_25],
        25_258_600.0,
    );
    rows[0].open = 373.859_985_351_562_5;
    rows[0].high = 375.899_993_896_484_4;
    rows[0].low = 366.769_989_013_671_9;
    let series = evaluate(Entity::new("MSFT", "Microsoft"), &rows, ScoringMode::Continuous)?;

    let path = store.save_table(&series, run_date()).await?;
    let mut reader = csv::Reader::from_path(&path)?;
    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

    assert_eq!(&records[0][1], "373.86");
    assert_eq!(&records[0][2], "375.9");
    assert_eq!(&records[0][3], "366.77");
    assert_eq!(&records[0][4], "370.87");
    assert_eq!(&records[0][5], "25258600");
    assert_eq!(&records[1][4], "370.6");
    Ok(())
}

#[tokio::test]
async fn test_undefined_aggregate_is_empty_cell_and_marker() -> anyhow::Result<()> {
    let tmp_dir = tempdir()?;
    let store = FsArtifactStore::new(tmp_dir.path())?;
    let mut series = sample_series();
    series.observations.clear();
    series.aggregate = Aggregate::new(None);

    let table = store.save_table(&series, run_date()).await?;
    let content = std::fs::read_to_string(table)?;
    let last = content.lines().last().unwrap();
    assert_eq!(last, "Aggregated,,,,,,,,,,,,,");

    let summary = store.save_summary(&series, Period::Month3).await?;
    assert_eq!(
        std::fs::read_to_string(summary)?,
        "Aggregated Trust Score (3mo): undefined"
    );
    Ok(())
}

#[tokio::test]
async fn test_summary_and_charts() -> anyhow::Result<()> {
    let tmp_dir = tempdir()?;
    let store = FsArtifactStore::new(tmp_dir.path())?;
    let series = sample_series();

    let summary = store.save_summary(&series, Period::Year1).await?;
    assert_eq!(summary.file_name().unwrap(), "MSFT_aggregated_score.txt");
    let text = std::fs::read_to_string(&summary)?;
    assert_eq!(
        text,
        format!("Aggregated Trust Score (1y): {}", series.aggregate.format_score())
    );

    let image = ChartImage {
        format: ImageFormat::Svg,
        bytes: b"<svg/>".to_vec(),
    };
    let entity_chart = store
        .save_entity_chart(&series.entity, run_date(), &image)
        .await?;
    assert_eq!(entity_chart.file_name().unwrap(), "MSFT_ts_2024-02-01.svg");
    assert_eq!(std::fs::read(&entity_chart)?, b"<svg/>");

    let global = store.save_comparison_chart(run_date(), &image).await?;
    assert_eq!(global.file_name().unwrap(), "global_ts_2024-02-01.svg");
    assert!(global.starts_with(store.root()));
    Ok(())
}

#[tokio::test]
async fn test_write_into_missing_directory_fails() -> anyhow::Result<()> {
    let tmp_dir = tempdir()?;
    let root = tmp_dir.path().join("gone");
    let store = FsArtifactStore::new(&root)?;
    std::fs::remove_dir_all(&root)?;

    let result = store.save_summary(&sample_series(), Period::Year1).await;
    assert!(matches!(
        result,
        Err(vigil_core::store::error::StoreError::Io(_))
    ));
    Ok(())
}

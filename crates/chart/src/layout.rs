use chrono::{DateTime, Duration, NaiveTime, Utc};
use vigil_core::common::Granularity;
use vigil_core::score::entity::{SCORE_MAX, SCORE_MIN, TimeBucket};

/// # Summary
/// 画布与绘图区的几何布局。
///
/// # Invariants
/// - 纵轴固定映射 [0, 10]，与数据范围无关。
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Frame {
    pub fn new(width: f64, height: f64, right_margin: f64) -> Self {
        Self {
            width,
            height,
            left: 70.0,
            right: width - right_margin,
            top: 50.0,
            bottom: height - 60.0,
        }
    }

    pub fn plot_width(&self) -> f64 {
        self.right - self.left
    }

    /// 信任分到纵坐标的映射，超出 [0, 10] 的值截断到边缘。
    pub fn y(&self, score: f64) -> f64 {
        let clamped = score.clamp(SCORE_MIN, SCORE_MAX);
        self.bottom - (clamped - SCORE_MIN) / (SCORE_MAX - SCORE_MIN) * (self.bottom - self.top)
    }
}

/// # Summary
/// 共享时间轴：把时间线性映射到绘图区横坐标。
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeAxis {
    /// 由全部时间点构造；没有时间点时返回 None。
    pub fn from_times(times: impl IntoIterator<Item = DateTime<Utc>>) -> Option<Self> {
        let mut iter = times.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(Self { start, end })
    }

    fn span_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// 时间到横坐标；只有单个时间点时放在绘图区中央。
    pub fn x(&self, frame: &Frame, t: DateTime<Utc>) -> f64 {
        let span = self.span_seconds();
        if span <= 0 {
            return frame.left + frame.plot_width() / 2.0;
        }
        let offset = (t - self.start).num_seconds();
        frame.left + seconds(offset) / seconds(span) * frame.plot_width()
    }

    /// # Summary
    /// 生成横轴刻度。
    ///
    /// # Logic
    /// 1. 在区间内等距取至多 `max_ticks` 个时间点。
    /// 2. 按粒度和跨度选择标签格式。
    pub fn ticks(&self, max_ticks: i64, granularity: Granularity) -> Vec<(DateTime<Utc>, String)> {
        let span = self.span_seconds();
        let format = tick_format(span, granularity);
        if span <= 0 || max_ticks < 2 {
            return vec![(self.start, self.start.format(format).to_string())];
        }
        (0..max_ticks)
            .map(|k| {
                let t = self.start + Duration::seconds(span * k / (max_ticks - 1));
                (t, t.format(format).to_string())
            })
            .collect()
    }
}

fn tick_format(span_seconds: i64, granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Monthly => "%Y-%m",
        Granularity::PerObservation if span_seconds < 3 * 86_400 => "%m-%d %H:%M",
        Granularity::PerObservation => "%Y-%m-%d",
    }
}

fn seconds(n: i64) -> f64 {
    i32::try_from(n).map_or_else(|_| f64::from(i32::MAX), f64::from)
}

/// 时间桶在时间轴上的位置：月度桶放在月末零点。
pub fn bucket_time(bucket: TimeBucket) -> DateTime<Utc> {
    match bucket {
        TimeBucket::Instant(t) => t,
        TimeBucket::MonthEnd(date) => date.and_time(NaiveTime::MIN).and_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_y_axis_fixed_domain() {
        let frame = Frame::new(1000.0, 500.0, 30.0);
        assert_eq!(frame.y(0.0), frame.bottom);
        assert_eq!(frame.y(10.0), frame.top);
        assert_eq!(frame.y(15.0), frame.top);
        assert!((frame.y(5.0) - (frame.top + frame.bottom) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_axis_mapping() {
        let frame = Frame::new(1000.0, 500.0, 30.0);
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        let axis = TimeAxis::from_times([b, a]).unwrap();
        assert_eq!(axis.x(&frame, a), frame.left);
        assert_eq!(axis.x(&frame, b), frame.right);

        let single = TimeAxis::from_times([a]).unwrap();
        assert_eq!(single.x(&frame, a), frame.left + frame.plot_width() / 2.0);
        assert!(TimeAxis::from_times(Vec::new()).is_none());
    }

    #[test]
    fn test_ticks_and_formats() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let axis = TimeAxis::from_times([a, b]).unwrap();
        let ticks = axis.ticks(6, Granularity::Monthly);
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0].1, "2024-01");
        assert_eq!(ticks[5].0, b);

        let intraday = TimeAxis::from_times([a, a + Duration::hours(6)]).unwrap();
        assert_eq!(intraday.ticks(2, Granularity::PerObservation)[1].1, "01-01 06:00");
    }

    #[test]
    fn test_month_bucket_time() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            bucket_time(TimeBucket::MonthEnd(date)),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }
}

//! Analytics API
//!
//! Message logs, usage breakdowns and delivery statistics for an app over a
//! date window. Dates are sent as `YYYY-MM-DD`.

use std::sync::Arc;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use super::{PartnerApi, PartnerContext};
use crate::error::GupshupError;
use crate::types::{Params, RequestSpec};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns [`GupshupError::InvalidArgument`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GupshupError> {
        if start > end {
            return Err(GupshupError::InvalidArgument(format!(
                "date range starts after it ends: {} > {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, GupshupError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// From the same day one month earlier up to `today`.
    pub fn month_until(today: NaiveDate) -> Self {
        let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
        Self { start, end: today }
    }

    /// From the Monday of the current week up to `today`.
    pub fn week_until(today: NaiveDate) -> Self {
        let offset = u64::from(today.weekday().num_days_from_monday());
        let start = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
        Self { start, end: today }
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

/// The six analytics calls of a full report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub inbound: Value,
    pub daily_usage: Value,
    pub conversations: Value,
    pub delivery: Value,
    pub read: Value,
    pub failed: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayReport {
    pub outbound: Value,
    pub inbound: Value,
    pub daily_usage: Value,
}

/// Totals and percentage rates derived from delivery/read/failed stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_read: u64,
    pub total_failed: u64,
    pub delivery_rate: f64,
    pub read_rate: f64,
    pub failure_rate: f64,
}

impl SummaryMetrics {
    /// Rates are 0 when their denominator is 0.
    pub fn from_stats(delivery: &Value, read: &Value, failed: &Value) -> Self {
        let total_delivered = stat_total(delivery);
        let total_read = stat_total(read);
        let total_failed = stat_total(failed);
        let total_sent = total_delivered.saturating_add(total_failed);

        Self {
            total_sent,
            total_delivered,
            total_read,
            total_failed,
            delivery_rate: percentage(total_delivered, total_sent),
            read_rate: percentage(total_read, total_delivered),
            failure_rate: percentage(total_failed, total_sent),
        }
    }
}

pub struct AnalyticsApi {
    context: Arc<PartnerContext>,
}

impl AnalyticsApi {
    pub fn new(context: Arc<PartnerContext>) -> Self {
        Self { context }
    }

    pub async fn inbound_logs(&self, app_id: &str, range: &DateRange) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/logs/inbound", range).await
    }

    /// Outbound logs for a single day.
    pub async fn outbound_logs(&self, app_id: &str, date: NaiveDate) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("date", date.format(DATE_FORMAT).to_string());
        self.context
            .app_call(
                app_id,
                RequestSpec::get("/partner/app/logs/outbound").params(params),
            )
            .await
    }

    pub async fn daily_usage(&self, app_id: &str, range: &DateRange) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/analytics/daily", range).await
    }

    pub async fn conversations_by_category(
        &self,
        app_id: &str,
        range: &DateRange,
    ) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/analytics/conversations", range)
            .await
    }

    pub async fn delivery_stats(
        &self,
        app_id: &str,
        range: &DateRange,
    ) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/analytics/delivery", range).await
    }

    pub async fn read_stats(&self, app_id: &str, range: &DateRange) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/analytics/read", range).await
    }

    pub async fn failed_stats(&self, app_id: &str, range: &DateRange) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/analytics/failed", range).await
    }

    pub async fn international_auth(
        &self,
        app_id: &str,
        range: &DateRange,
    ) -> Result<Value, GupshupError> {
        self.ranged(app_id, "/partner/app/analytics/international-auth", range)
            .await
    }

    /// Runs the six report calls concurrently; the first failure wins.
    pub async fn full_report(
        &self,
        app_id: &str,
        range: &DateRange,
    ) -> Result<AnalyticsReport, GupshupError> {
        // Resolve once so the concurrent calls share a cached app token.
        self.context.resolve_app_token(app_id, false).await?;

        let (inbound, daily_usage, conversations, delivery, read, failed) = tokio::try_join!(
            self.inbound_logs(app_id, range),
            self.daily_usage(app_id, range),
            self.conversations_by_category(app_id, range),
            self.delivery_stats(app_id, range),
            self.read_stats(app_id, range),
            self.failed_stats(app_id, range),
        )?;

        Ok(AnalyticsReport {
            inbound,
            daily_usage,
            conversations,
            delivery,
            read,
            failed,
        })
    }

    pub async fn last_month(&self, app_id: &str) -> Result<AnalyticsReport, GupshupError> {
        self.full_report(app_id, &DateRange::month_until(local_today()))
            .await
    }

    pub async fn this_week(&self, app_id: &str) -> Result<AnalyticsReport, GupshupError> {
        self.full_report(app_id, &DateRange::week_until(local_today()))
            .await
    }

    pub async fn today(&self, app_id: &str) -> Result<TodayReport, GupshupError> {
        let today = local_today();
        let range = DateRange::single_day(today);

        Ok(TodayReport {
            outbound: self.outbound_logs(app_id, today).await?,
            inbound: self.inbound_logs(app_id, &range).await?,
            daily_usage: self.daily_usage(app_id, &range).await?,
        })
    }

    pub async fn summary_metrics(
        &self,
        app_id: &str,
        range: &DateRange,
    ) -> Result<SummaryMetrics, GupshupError> {
        let delivery = self.delivery_stats(app_id, range).await?;
        let read = self.read_stats(app_id, range).await?;
        let failed = self.failed_stats(app_id, range).await?;
        Ok(SummaryMetrics::from_stats(&delivery, &read, &failed))
    }

    async fn ranged(
        &self,
        app_id: &str,
        path: &str,
        range: &DateRange,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("startDate", range.start_str())
            .with("endDate", range.end_str());
        self.context
            .app_call(app_id, RequestSpec::get(path).params(params))
            .await
    }
}

impl PartnerApi for AnalyticsApi {
    fn context(&self) -> &PartnerContext {
        &self.context
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(value: &str) -> Result<NaiveDate, GupshupError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| GupshupError::InvalidArgument(format!("invalid date {:?}: {}", value, e)))
}

/// `total` as a count; numbers and numeric strings are accepted, anything else is 0.
fn stat_total(stats: &Value) -> u64 {
    match stats.get("total") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

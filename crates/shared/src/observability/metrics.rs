//! 指标模块
//!
//! 基于 metrics facade 记录积分引擎指标。recorder 由宿主进程安装，
//! 未安装时所有记录均为空操作。

/// 注册指标描述（出现在导出端点的 HELP 注释中）
pub fn describe_metrics(service_name: &str) {
    metrics::describe_counter!(
        "point_rule_evaluations_total",
        "Total number of point rule evaluations"
    );
    metrics::describe_histogram!(
        "point_rule_evaluation_duration_seconds",
        "Point rule evaluation duration in seconds"
    );
    metrics::describe_counter!(
        "point_rule_candidates_total",
        "Total number of candidate rules matched across evaluations"
    );
    metrics::describe_counter!("points_awarded_total", "Total number of points awarded");
    metrics::describe_counter!(
        "point_rule_evaluation_errors_total",
        "Total number of failed point rule evaluations"
    );

    metrics::describe_gauge!("point_rules_loaded", "Number of rules in the current snapshot");
    metrics::describe_counter!(
        "point_rule_load_failures_total",
        "Total number of rule documents rejected at load time"
    );

    // 记录服务启动
    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 记录一次积分评估
#[inline]
pub fn record_evaluation(policy: &str, candidates: usize, points: i64, duration_secs: f64) {
    metrics::counter!("point_rule_evaluations_total", "policy" => policy.to_string()).increment(1);
    metrics::histogram!(
        "point_rule_evaluation_duration_seconds",
        "policy" => policy.to_string()
    )
    .record(duration_secs);

    metrics::counter!("point_rule_candidates_total").increment(candidates as u64);
    if points > 0 {
        metrics::counter!("points_awarded_total").increment(points.unsigned_abs());
    }
}

/// 记录一次失败的评估
#[inline]
pub fn record_evaluation_error(code: &str) {
    metrics::counter!("point_rule_evaluation_errors_total", "code" => code.to_string())
        .increment(1);
}

/// 记录当前快照中的规则数
#[inline]
pub fn record_rules_loaded(count: usize) {
    metrics::gauge!("point_rules_loaded").set(count as f64);
}

/// 记录加载时被拒绝的规则文档数
#[inline]
pub fn record_load_failures(failed: usize) {
    metrics::counter!("point_rule_load_failures_total").increment(failed as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        describe_metrics("point-engine");
        record_evaluation("best_of", 2, 5, 0.001);
        record_evaluation("stacking", 0, 0, 0.0005);
        record_evaluation_error("ARITHMETIC_ERROR");
        record_rules_loaded(8);
        record_load_failures(1);
    }
}

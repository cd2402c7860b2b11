use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::client::RegistrationClient;

impl RegistrationClient {
    /// 心跳循环：每个周期续约一次，出错只记录日志，直到被取消
    pub(crate) async fn heartbeat_loop(self: Arc<Self>, cancel: CancellationToken) {
        let period = self.heartbeat_interval();

        tracing::info!(
            instance_id = %self.instance_id(),
            interval_secs = period.as_secs(),
            "Heartbeat loop started"
        );

        let mut consecutive_failures: u32 = 0;
        loop {
            // 每次续约结束后等满一个周期；刚注册完成，第一次心跳同样先等待
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.renew() => match result {
                    Ok(()) => {
                        if consecutive_failures > 0 {
                            tracing::info!(
                                instance_id = %self.instance_id(),
                                failed_heartbeats = consecutive_failures,
                                "Heartbeat recovered"
                            );
                        }
                        consecutive_failures = 0;
                    }
                    Err(e) => {
                        consecutive_failures = consecutive_failures.saturating_add(1);
                        tracing::error!(
                            instance_id = %self.instance_id(),
                            consecutive_failures,
                            error = %e,
                            "Failed to send heartbeat"
                        );
                    }
                }
            }
        }

        tracing::info!(instance_id = %self.instance_id(), "Heartbeat loop stopped");
    }
}

use crate::core::partition::slice_range;
use crate::domain::model::{JobOutput, MapJob, PartitionStat};
use crate::utils::error::{Result, SmokeError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Runs map jobs on blocking tasks, at most `threads` partitions at a time.
#[derive(Debug, Clone)]
pub struct PartitionExecutor {
    threads: usize,
    progress: bool,
}

impl PartitionExecutor {
    pub fn new(threads: usize, progress: bool) -> Self {
        Self {
            threads: threads.max(1),
            progress,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub async fn execute(&self, job: &MapJob) -> Result<JobOutput> {
        let slices = slice_range(job.data.clone(), job.num_slices)?;
        let total = slices.len();
        let semaphore = Arc::new(Semaphore::new(self.threads));
        let mut handles = Vec::with_capacity(total);

        for (index, slice) in slices.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| SmokeError::JobFailed {
                    message: format!("executor closed: {}", e),
                })?;
            let op = Arc::clone(&job.op);

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let started = Instant::now();
                let values: Vec<i64> = slice.clone().map(|x| op(x)).collect();
                let stat = PartitionStat {
                    index,
                    start: slice.start,
                    end: slice.end,
                    count: values.len(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                (values, stat)
            }));
        }

        // 依分區順序收集，保持資料原順序
        let mut output = JobOutput {
            values: Vec::with_capacity(job.len()),
            partitions: Vec::with_capacity(total),
        };
        for (done, handle) in handles.into_iter().enumerate() {
            let (values, stat) = handle.await.map_err(|e| SmokeError::JobFailed {
                message: format!("partition {} failed: {}", done, e),
            })?;
            if self.progress {
                tracing::info!("[Stage 0: {}/{} partitions]", done + 1, total);
            }
            output.values.extend(values);
            output.partitions.push(stat);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_preserves_order() {
        let executor = PartitionExecutor::new(3, false);
        let job = MapJob::squares(1_000, 7);
        let output = executor.execute(&job).await.unwrap();

        let expected: Vec<i64> = (0..1_000).map(|x| x * x).collect();
        assert_eq!(output.values, expected);
        assert_eq!(output.partitions.len(), 7);
        assert_eq!(output.partitions.iter().map(|p| p.count).sum::<usize>(), 1_000);
        assert!(output
            .partitions
            .iter()
            .enumerate()
            .all(|(i, p)| p.index == i));
    }

    #[tokio::test]
    async fn test_panicking_partition_fails_job() {
        let executor = PartitionExecutor::new(2, false);
        let job = MapJob::new(
            0..10,
            2,
            Arc::new(|x| {
                if x == 7 {
                    panic!("boom");
                }
                x
            }),
        );

        let err = executor.execute(&job).await.unwrap_err();
        assert!(matches!(err, SmokeError::JobFailed { .. }));
    }

    #[test]
    fn test_zero_threads_clamped() {
        assert_eq!(PartitionExecutor::new(0, false).threads(), 1);
    }
}

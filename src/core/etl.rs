use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// 依序執行單一 stage 的 extract → transform → load
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        let started = Instant::now();
        tracing::info!("🚀 Starting stage '{}'", name);
        self.monitor.log_stats(&format!("{} start", name));

        tracing::debug!("[{}] extract", name);
        let extracted = self.pipeline.extract()?;
        self.monitor.log_stats(&format!("{} extract", name));

        tracing::debug!("[{}] transform", name);
        let transformed = self.pipeline.transform(extracted)?;
        self.monitor.log_stats(&format!("{} transform", name));

        tracing::debug!("[{}] load", name);
        let output = self.pipeline.load(transformed)?;
        self.monitor.log_stats(&format!("{} load", name));

        tracing::info!(
            "✅ Stage '{}' finished in {:?}, output: {}",
            name,
            started.elapsed(),
            output
        );
        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use std::cell::RefCell;

    struct Recording {
        calls: RefCell<Vec<&'static str>>,
        fail_transform: bool,
    }

    impl Pipeline for Recording {
        type Extracted = Vec<u32>;
        type Transformed = u32;

        fn name(&self) -> &str {
            "recording"
        }

        fn extract(&self) -> Result<Vec<u32>> {
            self.calls.borrow_mut().push("extract");
            Ok(vec![1, 2, 3])
        }

        fn transform(&self, data: Vec<u32>) -> Result<u32> {
            self.calls.borrow_mut().push("transform");
            if self.fail_transform {
                return Err(EtlError::EmptyCorpusError {
                    source_name: "recording".to_string(),
                });
            }
            Ok(data.iter().sum())
        }

        fn load(&self, result: u32) -> Result<String> {
            self.calls.borrow_mut().push("load");
            Ok(format!("sum={}", result))
        }
    }

    #[test]
    fn test_phases_run_in_order() {
        let engine = EtlEngine::new(Recording {
            calls: RefCell::new(Vec::new()),
            fail_transform: false,
        });
        assert_eq!(engine.run().unwrap(), "sum=6");
        assert_eq!(
            *engine.pipeline().calls.borrow(),
            vec!["extract", "transform", "load"]
        );
    }

    #[test]
    fn test_failure_stops_before_load() {
        let engine = EtlEngine::new_with_monitoring(
            Recording {
                calls: RefCell::new(Vec::new()),
                fail_transform: true,
            },
            false,
        );
        assert!(engine.run().is_err());
        assert_eq!(*engine.pipeline().calls.borrow(), vec!["extract", "transform"]);
    }
}

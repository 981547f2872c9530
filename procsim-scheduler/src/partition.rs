//! Splits an operation stream into per-process buckets.

use procsim_core::Operation;

/// One process, from its Application `begin` through its `finish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBucket {
    /// 1-based arrival ordinal.
    pub ordinal: usize,
    pub operations: Vec<Operation>,
}

impl ProcessBucket {
    pub fn io_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_io()).count()
    }
}

/// An operation stream cut at process boundaries.
///
/// Operations ahead of the first process form the `prefix`, operations after
/// the last process form the `suffix`. Anything between two processes travels
/// with the process that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub prefix: Vec<Operation>,
    pub processes: Vec<ProcessBucket>,
    pub suffix: Vec<Operation>,
}

impl Partition {
    pub fn split(operations: impl IntoIterator<Item = Operation>) -> Self {
        let mut partition = Partition::default();
        let mut pending: Vec<Operation> = Vec::new();
        let mut current: Option<Vec<Operation>> = None;

        for op in operations {
            if op.is_process_begin() {
                if let Some(open) = current.take() {
                    // A begin without a finish closes the open process.
                    partition.push_process(open);
                }
                let mut bucket = if partition.processes.is_empty() {
                    partition.prefix.append(&mut pending);
                    Vec::new()
                } else {
                    std::mem::take(&mut pending)
                };
                bucket.push(op);
                current = Some(bucket);
                continue;
            }

            match current.as_mut() {
                Some(bucket) => {
                    bucket.push(op);
                    if op.is_process_finish() {
                        if let Some(done) = current.take() {
                            partition.push_process(done);
                        }
                    }
                }
                None => pending.push(op),
            }
        }

        if let Some(open) = current.take() {
            partition.push_process(open);
        }
        if partition.processes.is_empty() {
            partition.prefix.append(&mut pending);
        } else {
            partition.suffix = pending;
        }
        partition
    }

    fn push_process(&mut self, operations: Vec<Operation>) {
        let ordinal = self.processes.len() + 1;
        self.processes.push(ProcessBucket {
            ordinal,
            operations,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procsim_core::{OpKind, OpLabel};

    fn op(kind: OpKind, label: OpLabel) -> Operation {
        Operation::new(kind, label, 1).unwrap()
    }

    #[test]
    fn splits_at_application_boundaries() {
        let ops = vec![
            op(OpKind::System, OpLabel::Begin),
            op(OpKind::Application, OpLabel::Begin),
            op(OpKind::Input, OpLabel::Keyboard),
            op(OpKind::Application, OpLabel::Finish),
            op(OpKind::Application, OpLabel::Begin),
            op(OpKind::Process, OpLabel::Run),
            op(OpKind::Application, OpLabel::Finish),
            op(OpKind::System, OpLabel::Finish),
        ];
        let partition = Partition::split(ops);
        assert_eq!(partition.prefix, vec![op(OpKind::System, OpLabel::Begin)]);
        assert_eq!(partition.suffix, vec![op(OpKind::System, OpLabel::Finish)]);
        assert_eq!(partition.processes.len(), 2);
        assert_eq!(partition.processes[0].io_count(), 1);
        assert_eq!(partition.processes[1].io_count(), 0);
        assert_eq!(partition.processes[1].ordinal, 2);
    }

    #[test]
    fn stray_operations_join_the_next_process() {
        let ops = vec![
            op(OpKind::Application, OpLabel::Begin),
            op(OpKind::Application, OpLabel::Finish),
            op(OpKind::Output, OpLabel::Monitor),
            op(OpKind::Application, OpLabel::Begin),
            op(OpKind::Application, OpLabel::Finish),
        ];
        let partition = Partition::split(ops);
        assert!(partition.prefix.is_empty());
        assert!(partition.suffix.is_empty());
        assert_eq!(partition.processes[1].operations.len(), 3);
        assert_eq!(partition.processes[1].io_count(), 1);
    }

    #[test]
    fn no_processes_keeps_everything_in_prefix() {
        let ops = vec![
            op(OpKind::System, OpLabel::Begin),
            op(OpKind::System, OpLabel::Finish),
        ];
        let partition = Partition::split(ops.clone());
        assert_eq!(partition.prefix, ops);
        assert!(partition.processes.is_empty());
    }
}

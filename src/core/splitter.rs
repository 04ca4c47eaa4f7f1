use crate::domain::model::{Label, Partition, Table};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_fraction;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub test_size: f64,
    pub seed: u64,
}

/// 原始列索引，各自依升冪排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// 測試集大小：ceil(test_size * n)，扣掉浮點誤差
pub fn test_count(test_size: f64, n: usize) -> usize {
    let exact = test_size * n as f64;
    (exact - 1e-9).ceil().max(0.0) as usize
}

/// 依類別比例分配測試名額：先取整數部分，餘數給小數部分最大的類別
fn allocate(class_counts: &[usize], n_test: usize) -> Vec<usize> {
    let n: usize = class_counts.iter().sum();
    if n == 0 {
        return vec![0; class_counts.len()];
    }

    let mut allocation: Vec<usize> = class_counts.iter().map(|&c| n_test * c / n).collect();
    let assigned: usize = allocation.iter().sum();

    let mut order: Vec<usize> = (0..class_counts.len()).collect();
    order.sort_by(|&a, &b| {
        let rem_a = (n_test * class_counts[a]) % n;
        let rem_b = (n_test * class_counts[b]) % n;
        rem_b
            .cmp(&rem_a)
            .then(class_counts[b].cmp(&class_counts[a]))
            .then(a.cmp(&b))
    });

    for &class in order.iter().take(n_test - assigned) {
        allocation[class] += 1;
    }
    allocation
}

pub fn stratified_indices(labels: &[Label], config: &SplitConfig) -> Result<SplitIndices> {
    validate_fraction("dataingestion.test_size", config.test_size)?;

    let n = labels.len();
    let n_test = test_count(config.test_size, n);
    if n_test == 0 || n_test >= n {
        return Err(EtlError::invalid_config(
            "dataingestion.test_size",
            config.test_size,
            format!(
                "Splitting {} records yields {} test and {} train records; both partitions must be non-empty",
                n,
                n_test,
                n.saturating_sub(n_test)
            ),
        ));
    }

    let mut by_class: Vec<Vec<usize>> = Label::ALL
        .iter()
        .map(|class| {
            labels
                .iter()
                .enumerate()
                .filter(|(_, l)| *l == class)
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let counts: Vec<usize> = by_class.iter().map(Vec::len).collect();
    let allocation = allocate(&counts, n_test);

    tracing::debug!(
        "Stratified split: class counts {:?}, test allocation {:?}",
        counts,
        allocation
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);

    for (indices, &take) in by_class.iter_mut().zip(&allocation) {
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(SplitIndices { train, test })
}

/// 分層抽樣切分，輸出維持原始列順序
pub fn split_corpus(table: &Table, labels: &[Label], config: &SplitConfig) -> Result<Partition> {
    if labels.len() != table.len() {
        return Err(EtlError::DimensionMismatchError {
            context: "label column".to_string(),
            expected: table.len(),
            got: labels.len(),
        });
    }

    let indices = stratified_indices(labels, config)?;
    let partition = Partition {
        train: table.select("train", &indices.train),
        test: table.select("test", &indices.test),
    };

    tracing::info!(
        "Split {} records into {} train / {} test (test_size={}, seed={})",
        table.len(),
        partition.train.len(),
        partition.test.len(),
        config.test_size,
        config.seed
    );
    Ok(partition)
}

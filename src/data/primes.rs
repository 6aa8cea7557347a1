use crate::error::PrimeSearchError;

/// First `count` primes, ascending.
pub fn generate_primes(count: usize) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }

    // p_n < n (ln n + ln ln n) for n >= 6
    let n = count.max(6) as f64;
    let mut limit = (n * (n.ln() + n.ln().ln())).ceil() as usize + 1;

    loop {
        let primes = sieve(limit);
        if primes.len() >= count {
            return primes.into_iter().take(count).collect();
        }
        limit *= 2;
    }
}

fn sieve(limit: usize) -> Vec<i64> {
    let mut is_prime = vec![true; limit + 1];
    is_prime[0] = false;
    if limit >= 1 {
        is_prime[1] = false;
    }

    let mut i = 2;
    while i * i <= limit {
        if is_prime[i] {
            let mut multiple = i * i;
            while multiple <= limit {
                is_prime[multiple] = false;
                multiple += i;
            }
        }
        i += 1;
    }

    is_prime
        .iter()
        .enumerate()
        .filter(|(_, &prime)| prime)
        .map(|(value, _)| value as i64)
        .collect()
}

/// Read-only sequence the search tries to reproduce, indexed from 1
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSequence {
    values: Vec<i64>,
}

impl TargetSequence {
    pub fn new(values: Vec<i64>) -> Result<Self, PrimeSearchError> {
        if values.is_empty() {
            return Err(PrimeSearchError::Configuration(
                "Target sequence must not be empty".to_string()
            ));
        }
        Ok(Self { values })
    }

    pub fn primes(count: usize) -> Result<Self, PrimeSearchError> {
        Self::new(generate_primes(count))
    }

    /// Value at a 1-based position
    pub fn get(&self, position: usize) -> Option<i64> {
        position.checked_sub(1).and_then(|i| self.values.get(i).copied())
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max_value(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// `(position, target)` pairs, positions starting at 1
    pub fn positions(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.values.iter().enumerate().map(|(i, &v)| (i as i64 + 1, v))
    }
}

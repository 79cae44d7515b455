use envconfig::Envconfig;

use crate::balancers::BalancerStrategy;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    /// `round-robin` or `smart-balance`; anything else falls back to round-robin
    #[envconfig(from = "BALANCER_ALGORITHM", default = "round-robin")]
    pub balancer_algorithm: String,
}

impl Config {
    pub fn strategy(&self) -> BalancerStrategy {
        BalancerStrategy::from_name_or_default(Some(&self.balancer_algorithm))
    }
}

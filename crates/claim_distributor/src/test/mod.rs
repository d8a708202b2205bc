pub mod test_distribution;

/// Receiver of a finished demographic model, such as an ancestral simulation engine.
///
/// Populations are always added before the splits that reference them, and splits arrive in
/// chronological order.
pub trait DemographySink {
    type Error;

    fn add_population(&mut self, name: &str, initial_size: f64) -> Result<(), Self::Error>;

    fn add_population_split(
        &mut self,
        time: f64,
        derived: &[&str],
        ancestral: &str,
    ) -> Result<(), Self::Error>;
}

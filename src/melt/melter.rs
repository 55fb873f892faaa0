use crate::error::MeltError;
use crate::melt::shaper::{ElementShaper, Shaped};
use crate::melt::types::{MeltConfig, MeltSummary};
use crate::melt::writer::CsvSinks;
use crate::schema::{BundleValidator, JsonSchemaValidator, NoValidation};
use crate::source::OsmElement;
use log::{debug, error};
use std::io::Write;

/// Shapes entities and gates them through a validator
pub struct OsmMelter {
    shaper: ElementShaper,
    validator: Box<dyn BundleValidator>,
}

impl OsmMelter {
    /// Build a melter for `config`, validating with the built-in schemas when enabled
    pub fn new(config: &MeltConfig) -> Result<Self, MeltError> {
        let validator: Box<dyn BundleValidator> = if config.validate {
            Box::new(JsonSchemaValidator::new()?)
        } else {
            Box::new(NoValidation)
        };
        Ok(Self::with_validator(config, validator))
    }

    pub fn with_validator(config: &MeltConfig, validator: Box<dyn BundleValidator>) -> Self {
        OsmMelter {
            shaper: ElementShaper::new(config),
            validator,
        }
    }

    /// Shape and validate one entity
    ///
    /// Returns `Ok(None)` for entities that produce no rows.
    pub fn melt(&self, element: &OsmElement) -> Result<Option<Shaped>, MeltError> {
        let Some(shaped) = self.shaper.shape(element) else {
            return Ok(None);
        };

        if let Err(err) = self.validator.validate(&shaped.bundle) {
            error!(
                "Rejecting {} {}",
                shaped.bundle.kind(),
                shaped.bundle.entity_id().unwrap_or("?")
            );
            return Err(err);
        }
        Ok(Some(shaped))
    }

    /// Melt every entity of a stream into the sinks
    ///
    /// Stops at the first parse or validation error; the rejected bundle is
    /// not written.
    pub fn melt_all<I, W>(&self, elements: I, sinks: &mut CsvSinks<W>) -> Result<MeltSummary, MeltError>
    where
        I: IntoIterator<Item = Result<OsmElement, MeltError>>,
        W: Write,
    {
        let mut summary = MeltSummary::default();

        for element in elements {
            let element = element?;
            let Some(shaped) = self.melt(&element)? else {
                continue;
            };

            sinks.write_bundle(&shaped.bundle)?;
            debug!(
                "Wrote {} {}",
                shaped.bundle.kind(),
                shaped.bundle.entity_id().unwrap_or("?")
            );

            summary.record(&shaped.bundle);
            summary.dropped_tags += shaped.dropped_tags;
            summary.cleaning_failures += shaped.cleaning_failures.len();
        }

        sinks.flush()?;
        Ok(summary)
    }
}

use summary_datastore::DataStore;

use crate::{archive::ArchiveStore, CompletionService, SummaryService};

pub struct SummaryServiceBuilder<D = (), C = (), A = ()> {
    store: D,
    completion: C,
    archive: A,
    refine: bool,
}

impl SummaryServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: (),
            completion: (),
            archive: (),
            refine: false,
        }
    }
}

impl Default for SummaryServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, C, A> SummaryServiceBuilder<D, C, A> {
    pub fn store<D2: DataStore + Send + Sync + 'static>(
        self,
        store: D2,
    ) -> SummaryServiceBuilder<D2, C, A> {
        SummaryServiceBuilder {
            store,
            completion: self.completion,
            archive: self.archive,
            refine: self.refine,
        }
    }

    pub fn completion<C2: CompletionService + Send + Sync + 'static>(
        self,
        completion: C2,
    ) -> SummaryServiceBuilder<D, C2, A> {
        SummaryServiceBuilder {
            store: self.store,
            completion,
            archive: self.archive,
            refine: self.refine,
        }
    }

    pub fn archive<A2: ArchiveStore + Send + Sync + 'static>(
        self,
        archive: A2,
    ) -> SummaryServiceBuilder<D, C, A2> {
        SummaryServiceBuilder {
            store: self.store,
            completion: self.completion,
            archive,
            refine: self.refine,
        }
    }

    /// Adds the rewrite-for-brevity pass after the draft
    pub fn with_refinement(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }
}

impl<D, C, A> SummaryServiceBuilder<D, C, A>
where
    D: DataStore + Send + Sync + 'static,
    C: CompletionService + Send + Sync + 'static,
    A: ArchiveStore + Send + Sync + 'static,
{
    pub fn build(self) -> SummaryService<D, C, A> {
        SummaryService {
            store: self.store,
            completion: self.completion,
            archive: self.archive,
            refine: self.refine,
        }
    }
}

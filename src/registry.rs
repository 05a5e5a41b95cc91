//! Sort catalog.
//!
//! Each [`SortDescriptor`] binds one generic algorithm to its three
//! instantiations, plus the constraints the controller checks before any
//! pass runs.

use crate::counters::OpCounters;
use crate::error::{HarnessError, SortResult, Violation};
use crate::proxy::{Bar, Counted, Element};
use crate::sorts::{distribution, exchange, insertion, merge, selection, SortEnv};
use crate::utils::bench::{ascending, shuffle};
use std::fmt;
use std::sync::Arc;

/// An algorithm instantiated for one element type.
pub type SortFn<T> = fn(&mut [T], &SortEnv) -> SortResult<()>;

/// The three instantiations of one algorithm.
#[derive(Clone, Copy)]
pub struct Variants {
    pub plain: SortFn<i32>,
    pub counted: SortFn<Counted>,
    pub animated: SortFn<Bar>,
}

/// Instantiates a generic sort for all three element types.
#[macro_export]
macro_rules! variants {
    ($($sort:ident)::+) => {
        $crate::registry::Variants {
            plain: $($sort)::+::<i32>,
            counted: $($sort)::+::<$crate::proxy::Counted>,
            animated: $($sort)::+::<$crate::proxy::Bar>,
        }
    };
}

/// A named predicate on the sample size.
#[derive(Clone)]
pub struct SizeRequirement {
    pub description: String,
    check: Arc<dyn Fn(usize) -> bool + Send + Sync>,
}

impl SizeRequirement {
    pub fn new(
        description: impl Into<String>,
        check: impl Fn(usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    pub fn power_of_two() -> Self {
        Self::new("size must be a power of two", |n| n.is_power_of_two())
    }

    pub fn accepts(&self, size: usize) -> bool {
        (self.check)(size)
    }
}

impl fmt::Debug for SizeRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SizeRequirement")
            .field(&self.description)
            .finish()
    }
}

#[derive(Clone)]
pub struct SortDescriptor {
    name: &'static str,
    description: &'static str,
    max_size: usize,
    requirements: Vec<SizeRequirement>,
    nondeterministic: bool,
    multi_threaded: bool,
    variants: Variants,
}

impl fmt::Debug for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("name", &self.name)
            .field("max_size", &self.max_size)
            .field("requirements", &self.requirements)
            .field("nondeterministic", &self.nondeterministic)
            .field("multi_threaded", &self.multi_threaded)
            .finish()
    }
}

impl SortDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        max_size: usize,
        variants: Variants,
    ) -> Self {
        Self {
            name,
            description,
            max_size,
            requirements: Vec::new(),
            nondeterministic: false,
            multi_threaded: false,
            variants,
        }
    }

    pub fn requirement(mut self, requirement: SizeRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Marks the algorithm as having no meaningful progress estimate.
    pub fn nondeterministic(mut self) -> Self {
        self.nondeterministic = true;
        self
    }

    /// Marks the algorithm as spawning workers that must not be cancelled.
    pub fn multi_threaded(mut self) -> Self {
        self.multi_threaded = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn requirements(&self) -> &[SizeRequirement] {
        &self.requirements
    }

    pub fn is_nondeterministic(&self) -> bool {
        self.nondeterministic
    }

    pub fn is_multi_threaded(&self) -> bool {
        self.multi_threaded
    }

    // ------------------------------------------------------------------------
    // Operator overrides
    // ------------------------------------------------------------------------

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    pub fn add_requirement(&mut self, requirement: SizeRequirement) {
        self.requirements.push(requirement);
    }

    /// Removes the requirement at `index`; returns whether one was removed.
    pub fn remove_requirement(&mut self, index: usize) -> bool {
        if index < self.requirements.len() {
            self.requirements.remove(index);
            true
        } else {
            false
        }
    }

    pub fn set_nondeterministic(&mut self, value: bool) {
        self.nondeterministic = value;
    }

    pub fn set_multi_threaded(&mut self, value: bool) {
        self.multi_threaded = value;
    }

    /// Every constraint `size` violates, in declaration order.
    pub fn check_size(&self, size: usize) -> Vec<Violation> {
        let mut violations = Vec::new();
        if size == 0 {
            violations.push(Violation::Empty);
        }
        if size > self.max_size {
            violations.push(Violation::TooLarge {
                size,
                max: self.max_size,
            });
        }
        violations.extend(
            self.requirements
                .iter()
                .filter(|r| !r.accepts(size))
                .map(|r| Violation::Requirement(r.description.clone())),
        );
        violations
    }

    pub fn run_plain(&self, data: &mut [i32], env: &SortEnv) -> SortResult<()> {
        (self.variants.plain)(data, env)
    }

    pub fn run_counted(&self, data: &mut [Counted], env: &SortEnv) -> SortResult<()> {
        (self.variants.counted)(data, env)
    }

    pub fn run_animated(&self, data: &mut [Bar], env: &SortEnv) -> SortResult<()> {
        (self.variants.animated)(data, env)
    }

    /// Runs the plain and counting instantiations on small shuffled samples
    /// and compares them against `slice::sort`.
    pub fn verify(&self) -> Result<(), String> {
        let sizes = [1, 2, 3, 8, 16, 31, 64];
        for &size in sizes.iter().filter(|&&s| self.check_size(s).is_empty()) {
            let env = SortEnv::new(size as u64);
            let mut data = ascending(size);
            // duplicates and negatives
            for (i, v) in data.iter_mut().enumerate() {
                *v = (*v % 7) - (i % 3) as i32;
            }
            shuffle(&mut data, 0xC0FFEE).map_err(|e| e.to_string())?;
            let mut expected = data.clone();
            expected.sort();

            let mut plain = data.clone();
            self.run_plain(&mut plain, &env)
                .map_err(|e| format!("{} (plain, n={}): {}", self.name, size, e))?;
            if plain != expected {
                return Err(format!("{} (plain, n={}) produced {:?}", self.name, size, plain));
            }

            let tally = Arc::new(OpCounters::new());
            let mut counted = Counted::live_from(&data, &tally);
            self.run_counted(&mut counted, &env)
                .map_err(|e| format!("{} (counted, n={}): {}", self.name, size, e))?;
            let counted: Vec<i32> = counted.iter().map(Element::peek).collect();
            if counted != expected {
                return Err(format!("{} (counted, n={}) produced {:?}", self.name, size, counted));
            }
        }
        Ok(())
    }
}

/// Ordered list of sorts offered to the user.
#[derive(Debug, Default, Clone)]
pub struct SortCatalog {
    sorts: Vec<SortDescriptor>,
}

impl SortCatalog {
    pub fn new() -> Self {
        Self { sorts: Vec::new() }
    }

    pub fn register(&mut self, descriptor: SortDescriptor) {
        self.sorts.push(descriptor);
    }

    pub fn all(&self) -> &[SortDescriptor] {
        &self.sorts
    }

    pub fn len(&self) -> usize {
        self.sorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&SortDescriptor, HarnessError> {
        let len = self.sorts.len();
        self.sorts
            .get(index)
            .ok_or(HarnessError::UnknownSort { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut SortDescriptor, HarnessError> {
        let len = self.sorts.len();
        self.sorts
            .get_mut(index)
            .ok_or(HarnessError::UnknownSort { index, len })
    }

    /// Catalog index of the sort called `name`.
    pub fn find(&self, name: &str) -> Result<usize, HarnessError> {
        self.sorts
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| HarnessError::UnknownName(name.to_string()))
    }

    pub fn list_names(&self) -> Vec<&'static str> {
        self.sorts.iter().map(|s| s.name).collect()
    }
}

/// Build the default catalog with all algorithms
pub fn build_catalog() -> SortCatalog {
    let mut catalog = SortCatalog::new();

    catalog.register(
        SortDescriptor::new(
            "bogo",
            "Shuffles until sorted",
            8,
            variants!(exchange::bogo),
        )
        .nondeterministic(),
    );
    catalog.register(SortDescriptor::new(
        "stooge",
        "Sorts the first two thirds, the last two thirds, then the first two thirds again",
        64,
        variants!(exchange::stooge),
    ));
    catalog.register(
        SortDescriptor::new(
            "sleep",
            "One sleeping worker per value; wake-up order is the output order",
            128,
            variants!(distribution::sleep),
        )
        .nondeterministic(),
    );
    catalog.register(SortDescriptor::new(
        "cycle",
        "Writes each element directly to its final position",
        256,
        variants!(selection::cycle),
    ));
    catalog.register(SortDescriptor::new(
        "bubble",
        "Swaps adjacent out-of-order pairs",
        256,
        variants!(exchange::bubble),
    ));
    catalog.register(SortDescriptor::new(
        "cocktail",
        "Bubble sort alternating direction",
        256,
        variants!(exchange::cocktail),
    ));
    catalog.register(SortDescriptor::new(
        "odd-even",
        "Compares odd-even then even-odd indexed pairs",
        256,
        variants!(exchange::odd_even),
    ));
    catalog.register(SortDescriptor::new(
        "selection",
        "Moves the minimum of the unsorted tail to its front",
        256,
        variants!(selection::selection),
    ));
    catalog.register(SortDescriptor::new(
        "double-selection",
        "Places both the minimum and the maximum on each sweep",
        256,
        variants!(selection::double_selection),
    ));
    catalog.register(SortDescriptor::new(
        "insertion",
        "Inserts each element into the sorted prefix",
        256,
        variants!(insertion::insertion),
    ));
    catalog.register(SortDescriptor::new(
        "bead",
        "Gravity sort: beads on one rod per value level fall into place",
        256,
        variants!(distribution::bead),
    ));
    catalog.register(SortDescriptor::new(
        "comb",
        "Bubble sort with a shrinking gap",
        8192,
        variants!(exchange::comb),
    ));
    catalog.register(SortDescriptor::new(
        "shell",
        "Gapped insertion sort over Ciura's gaps",
        8192,
        variants!(insertion::shell),
    ));
    catalog.register(
        SortDescriptor::new(
            "bitonic",
            "Bitonic sorting network",
            8192,
            variants!(merge::bitonic),
        )
        .requirement(SizeRequirement::power_of_two()),
    );
    catalog.register(SortDescriptor::new(
        "merge",
        "Bottom-up stable merge sort",
        8192,
        variants!(merge::merge),
    ));
    catalog.register(SortDescriptor::new(
        "heap",
        "Heapify, then repeatedly move the maximum to the end",
        8192,
        variants!(selection::heap),
    ));
    catalog.register(SortDescriptor::new(
        "quick",
        "Quicksort with a middle pivot",
        8192,
        variants!(exchange::quick),
    ));
    catalog.register(SortDescriptor::new(
        "radix",
        "Least-significant-digit radix sort in base 16",
        8192,
        variants!(distribution::radix),
    ));
    catalog.register(
        SortDescriptor::new(
            "parallel-merge",
            "Merge sort with halves sorted on worker threads",
            8192,
            variants!(merge::parallel_merge),
        )
        .multi_threaded(),
    );
    catalog.register(SortDescriptor::new(
        "counting",
        "Counts occurrences of each value",
        32768,
        variants!(distribution::counting),
    ));

    catalog
}

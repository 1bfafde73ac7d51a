//! Kernel registry for lookup and discovery.

use crate::error::{GemmError, Result};
use crate::gemm::{BlockedGemm, DynGemmKernel, GemmKernel, NaiveGemm, NdarrayGemm};
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor for a fresh kernel instance.
pub type KernelFactory = Arc<dyn Fn() -> DynGemmKernel + Send + Sync>;

/// Name-keyed table of kernel factories.
///
/// Every `create` builds a new instance; instances are never shared.
#[derive(Default, Clone)]
pub struct KernelRegistry {
    factories: HashMap<String, KernelFactory>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry populated with every built-in kernel.
    pub fn with_default_kernels() -> Self {
        let mut registry = Self::new();
        registry.register_kernel::<NaiveGemm>("naive");
        registry.register_kernel::<BlockedGemm>("blocked");
        registry.register_kernel::<NdarrayGemm>("ndarray");
        registry
    }

    /// Stores `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> DynGemmKernel + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(kernel = %name, "registering gemm kernel");
        if self.factories.insert(name.clone(), Arc::new(factory)).is_some() {
            tracing::warn!(kernel = %name, "replaced existing kernel registration");
        }
    }

    /// Registers a kernel type through its `Default` constructor.
    pub fn register_kernel<K>(&mut self, name: impl Into<String>)
    where
        K: GemmKernel + Default + 'static,
    {
        self.register(name, || Box::new(K::default()) as DynGemmKernel);
    }

    pub fn create(&self, name: &str) -> Result<DynGemmKernel> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| GemmError::NotFound(name.to_string()))
    }

    /// Registered names in no particular order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderFailedEvent, OrderPaidEvent};

/// Producers handed to the APIs that publish events. Empty by default, in which case nothing is published.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_paid_producer: Vec<EventProducer<OrderPaidEvent>>,
    pub order_failed_producer: Vec<EventProducer<OrderFailedEvent>>,
}

pub struct EventHandlers {
    pub on_order_paid: Option<EventHandler<OrderPaidEvent>>,
    pub on_order_failed: Option<EventHandler<OrderFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_paid = hooks.on_order_paid.map(|f| EventHandler::new(buffer_size, f));
        let on_order_failed = hooks.on_order_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_paid, on_order_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_paid {
            result.order_paid_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_failed {
            result.order_failed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns each configured handler on the runtime.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_paid {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_failed {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_paid: Option<Handler<OrderPaidEvent>>,
    pub on_order_failed: Option<Handler<OrderFailedEvent>>,
}

impl EventHooks {
    pub fn on_order_paid<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPaidEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_paid = Some(Arc::new(f));
        self
    }

    pub fn on_order_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_failed = Some(Arc::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::connection::{spawn_writer, Outbox, SinkAdapter};
    use crate::error::{DeliveryError, TransportError};
    use crate::response::Response;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // Mock implementation of SinkAdapter for testing
    struct MockSink {
        responses: Arc<Mutex<Vec<Response>>>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SinkAdapter for MockSink {
        async fn send(&mut self, response: Response) -> Result<(), TransportError> {
            self.responses.lock().unwrap().push(response);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    // Sink whose peer has already gone away
    struct BrokenSink;

    #[async_trait]
    impl SinkAdapter for BrokenSink {
        async fn send(&mut self, _response: Response) -> Result<(), TransportError> {
            Err(TransportError::Closed)
        }
    }

    // Sink that never completes a write
    struct StalledSink;

    #[async_trait]
    impl SinkAdapter for StalledSink {
        async fn send(&mut self, _response: Response) -> Result<(), TransportError> {
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    fn mock_sink() -> (MockSink, Arc<Mutex<Vec<Response>>>, Arc<AtomicBool>) {
        let responses = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let sink = MockSink {
            responses: responses.clone(),
            closed: closed.clone(),
        };
        (sink, responses, closed)
    }

    #[tokio::test]
    async fn test_writer_drains_in_order_and_closes() {
        let (sink, responses, closed) = mock_sink();
        let (outbox, receiver) = Outbox::channel(1, 8);
        let writer = spawn_writer(1, sink, receiver, Duration::from_secs(1));

        outbox.deliver(Response::system("one")).unwrap();
        outbox.deliver(Response::system("two")).unwrap();
        drop(outbox);

        writer.await.unwrap();

        let responses = responses.lock().unwrap();
        assert_eq!(
            *responses,
            vec![Response::system("one"), Response::system("two")]
        );
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_full_outbox_rejects_without_blocking() {
        let (outbox, _receiver) = Outbox::channel(7, 1);
        assert_eq!(outbox.client_id(), 7);

        outbox.deliver(Response::system("fits")).unwrap();
        assert_eq!(
            outbox.deliver(Response::system("overflow")),
            Err(DeliveryError::Full)
        );
    }

    #[tokio::test]
    async fn test_failed_write_closes_outbox() {
        let (outbox, receiver) = Outbox::channel(2, 8);
        let writer = spawn_writer(2, BrokenSink, receiver, Duration::from_secs(1));

        outbox.deliver(Response::system("lost")).unwrap();
        writer.await.unwrap();

        assert!(outbox.is_closed());
        assert_eq!(
            outbox.deliver(Response::system("after")),
            Err(DeliveryError::Closed)
        );
    }

    #[tokio::test]
    async fn test_stalled_write_times_out() {
        let (outbox, receiver) = Outbox::channel(3, 8);
        let writer = spawn_writer(3, StalledSink, receiver, Duration::from_millis(50));

        outbox.deliver(Response::system("stuck")).unwrap();

        tokio::time::timeout(Duration::from_secs(2), writer)
            .await
            .expect("writer should give up after the send timeout")
            .unwrap();
        assert!(outbox.is_closed());
    }
}

use tokio::sync::mpsc;

/// Held by a running service; dropping (or `unlock`) releases it.
#[derive(Clone, Debug)]
pub struct ShutdownLock {
    _sender: mpsc::Sender<()>,
}

impl ShutdownLock {
    pub fn unlock(self) {
        drop(self)
    }
}

#[derive(Debug)]
pub struct ShutdownWait {
    receiver: mpsc::Receiver<()>,
}

impl ShutdownWait {
    /// wait until all locks are released
    pub async fn wait(&mut self) {
        let _ = self.receiver.recv().await;
    }
}

pub fn create_lock_and_wait() -> (ShutdownLock, ShutdownWait) {
    let (tx, rx) = mpsc::channel(1);
    (ShutdownLock { _sender: tx }, ShutdownWait { receiver: rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_after_all_locks_released() {
        let (lock, mut wait) = create_lock_and_wait();
        let lock2 = lock.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            lock2.unlock();
        });
        lock.unlock();
        tokio::time::timeout(Duration::from_secs(1), wait.wait())
            .await
            .expect("wait timed out");
        handle.await.unwrap();
    }
}

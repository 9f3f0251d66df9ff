use std::sync::{Arc, Mutex};

use super::*;

#[derive(Default)]
struct RecordingAssociation {
    opened: Mutex<Vec<(u16, Reliability, bool)>>,
    sent: Mutex<Vec<(u16, u32, Bytes)>>,
    closed: Mutex<Vec<u16>>,
}

impl SctpAssociation for RecordingAssociation {
    fn open_stream(&self, sid: u16, reliability: Reliability, ordered: bool) -> Result<()> {
        self.opened.lock().unwrap().push((sid, reliability, ordered));
        Ok(())
    }

    fn send(&self, sid: u16, ppid: u32, bytes: Bytes) -> Result<()> {
        self.sent.lock().unwrap().push((sid, ppid, bytes));
        Ok(())
    }

    fn close_stream(&self, sid: u16) -> Result<()> {
        self.closed.lock().unwrap().push(sid);
        Ok(())
    }
}

#[test]
fn test_association_contract_records_calls() {
    let recording = Arc::new(RecordingAssociation::default());
    let assoc: Arc<dyn SctpAssociation> = recording.clone();
    assoc.open_stream(3, Reliability::MaxRetransmits(5), true).unwrap();
    assoc.send(3, 53, Bytes::from_static(b"hi")).unwrap();
    assoc.close_stream(3).unwrap();

    assert_eq!(
        recording.opened.lock().unwrap().as_slice(),
        &[(3, Reliability::MaxRetransmits(5), true)]
    );
    assert_eq!(recording.sent.lock().unwrap().len(), 1);
    assert_eq!(recording.closed.lock().unwrap().as_slice(), &[3]);
}

#[test]
fn test_reliability_default_is_reliable() {
    assert_eq!(Reliability::default(), Reliability::Reliable);
}

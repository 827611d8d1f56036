use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record, RecordType};
use plain_upstream_infrastructure::dns::MessageBuilder;
use std::net::Ipv4Addr;

/// Address answered by the mock server over UDP.
pub const UDP_ANSWER: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 1);

/// Address answered by the mock server over TCP.
pub const TCP_ANSWER: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 2);

pub struct QueryBuilder;

impl QueryBuilder {
    pub fn a(domain: &str) -> Message {
        MessageBuilder::build_query(domain, RecordType::A).unwrap()
    }

    pub fn example() -> Message {
        Self::a("example.com.")
    }
}

/// Builds a reply echoing the question of `query`, with `answers` A records
/// pointing at `ip`.
pub fn build_reply(query: &Message, truncated: bool, ip: Ipv4Addr, answers: usize) -> Message {
    let mut reply = Message::new();
    reply
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(query.op_code())
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_truncated(truncated);
    reply.add_queries(query.queries().to_vec());

    if let Some(question) = query.queries().first() {
        for _ in 0..answers {
            reply.add_answer(Record::from_rdata(
                question.name().clone(),
                60,
                RData::A(A::from(ip)),
            ));
        }
    }

    reply
}

/// First A record of `message`.
pub fn first_a(message: &Message) -> Option<Ipv4Addr> {
    message.answers().iter().find_map(|record| match record.data() {
        Some(RData::A(a)) => Some(a.0),
        _ => None,
    })
}
